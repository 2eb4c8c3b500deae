//! Caption source abstraction for Scoper.
//!
//! Provides a trait-based interface for fetching timed captions (YouTube,
//! in-memory fixtures) and the URL parsing that feeds it.

mod memory;
mod youtube;

pub use memory::MemoryCaptionSource;
pub use youtube::YoutubeCaptionSource;

use crate::error::{Result, ScoperError};
use crate::transcript::CaptionRecord;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Trait for caption providers.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the timed captions of a video, trying `languages` in order.
    ///
    /// Returns an empty list or an error when the video has no captions in
    /// any of the requested languages.
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<CaptionRecord>>;
}

fn video_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^.*(youtu.be/|v/|e/|u/\w+/|embed/|v=)([^#&?]*).*").expect("Invalid regex")
    })
}

fn bare_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("Invalid regex"))
}

/// Extract the video ID from a YouTube URL (watch, short link, embed) or a bare ID.
///
/// The ID is everything after the recognized prefix up to the next `#`, `&` or `?`.
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();

    if let Some(caps) = video_url_regex().captures(input) {
        let id = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if !id.is_empty() {
            return Ok(id.to_string());
        }
    } else if bare_id_regex().is_match(input) {
        return Ok(input.to_string());
    }

    Err(ScoperError::Parse(input.to_string()))
}
