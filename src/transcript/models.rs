//! Data models for caption transcripts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A raw caption line as delivered by a caption source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionRecord {
    /// Caption text, as published.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Display duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

impl CaptionRecord {
    /// Create a new caption record.
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Mapping from normalized caption text to its start offset.
///
/// Keys iterate in first-insertion order. When two records normalize to the
/// same text, the later start time replaces the earlier one but the caption
/// keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<(String, f64)>,
    positions: HashMap<String, usize>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transcript from raw records, lowercasing each caption.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CaptionRecord>,
    {
        let mut transcript = Self::new();
        for record in records {
            transcript.insert(record.text.to_lowercase(), record.start);
        }
        transcript
    }

    fn insert(&mut self, caption: String, start: f64) {
        match self.positions.get(&caption) {
            Some(&idx) => self.entries[idx].1 = start,
            None => {
                self.positions.insert(caption.clone(), self.entries.len());
                self.entries.push((caption, start));
            }
        }
    }

    /// Start offset of a caption, if present.
    pub fn start_of(&self, caption: &str) -> Option<f64> {
        self.positions.get(caption).map(|&idx| self.entries[idx].1)
    }

    /// Whether a caption is a key of this transcript.
    pub fn contains(&self, caption: &str) -> bool {
        self.positions.contains_key(caption)
    }

    /// Captions in transcript order.
    pub fn captions(&self) -> Vec<&str> {
        self.entries.iter().map(|(caption, _)| caption.as_str()).collect()
    }

    /// Iterate over (caption, start) pairs in transcript order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(caption, start)| (caption.as_str(), *start))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for Transcript {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::from_records(
            iter.into_iter()
                .map(|(text, start)| CaptionRecord::new(text, start, 0.0)),
        )
    }
}

/// One ranked caption with its resolved timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCaption {
    /// Normalized caption text.
    pub caption: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Human-readable start time (e.g. "29m 56s").
    pub duration: String,
}

impl RankedCaption {
    /// Link to the caption's moment in the video.
    pub fn url_with_timestamp(&self, video_id: &str) -> String {
        format!(
            "https://youtube.com/watch?v={}&t={}s",
            video_id,
            self.start_seconds.max(0.0) as u64
        )
    }
}
