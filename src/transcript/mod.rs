//! Caption transcripts and their presentation.
//!
//! A [`Transcript`] maps each normalized caption to the moment it starts.
//! It is built fresh for every query and never mutated afterwards.

mod format;
mod models;

pub use format::{compact_duration, format_duration, format_table, format_transcript, OutputFormat};
pub use models::{CaptionRecord, RankedCaption, Transcript};
