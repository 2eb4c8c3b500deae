//! Scoper - search inside YouTube videos
//!
//! Finds the moments in a video whose captions match a query.
//!
//! # Overview
//!
//! Scoper fetches a video's captions and ranks them against a query in one of
//! two modes:
//! - **Fuzzy**: lexical similarity, works for captions in any language
//! - **Semantic**: word-embedding distance from a model trained at startup
//!
//! Each result carries the caption text and its start time in the video.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `caption_source` - Caption source abstraction (YouTube, in-memory)
//! - `transcript` - Caption-to-timestamp mapping and formatting
//! - `embedding` - Word vectors: training, loading, lookup
//! - `ranking` - Fuzzy and semantic ranking strategies
//! - `orchestrator` - Query coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use scoper::config::Settings;
//! use scoper::orchestrator::Scoper;
//! use scoper::ranking::SearchMode;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let scoper = Scoper::new(settings)?;
//!
//!     let languages = vec!["en".to_string()];
//!     let results = scoper
//!         .search("https://youtu.be/7bD_r5u3znQ", "apple watch", 5, &languages, SearchMode::Fuzzy)
//!         .await?;
//!     for r in results {
//!         println!("{}  {}", r.caption, r.duration);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod caption_source;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod orchestrator;
pub mod ranking;
pub mod transcript;

pub use error::{Result, ScoperError};
