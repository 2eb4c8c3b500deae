//! Configuration module for Scoper.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    CaptionSettings, CorpusKind, EmbeddingSettings, GeneralSettings, SearchSettings,
    ServerSettings, Settings,
};
