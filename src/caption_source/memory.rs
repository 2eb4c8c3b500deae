//! In-memory caption source.
//!
//! Useful for testing and for searching transcripts obtained elsewhere.

use super::CaptionSource;
use crate::error::{Result, ScoperError};
use crate::transcript::CaptionRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory caption source keyed by video ID.
pub struct MemoryCaptionSource {
    videos: RwLock<HashMap<String, Vec<CaptionRecord>>>,
}

impl MemoryCaptionSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self {
            videos: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style insert.
    pub fn with_video(self, video_id: &str, records: Vec<CaptionRecord>) -> Self {
        self.insert(video_id, records);
        self
    }

    /// Register the captions of a video, replacing any previous ones.
    pub fn insert(&self, video_id: &str, records: Vec<CaptionRecord>) {
        let mut videos = self.videos.write().unwrap_or_else(|e| e.into_inner());
        videos.insert(video_id.to_string(), records);
    }
}

impl Default for MemoryCaptionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptionSource for MemoryCaptionSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, video_id: &str, _languages: &[String]) -> Result<Vec<CaptionRecord>> {
        let videos = self.videos.read().unwrap_or_else(|e| e.into_inner());
        videos
            .get(video_id)
            .cloned()
            .ok_or_else(|| ScoperError::AdapterFailure(format!("No captions for video {}", video_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_caption_source() {
        let source = MemoryCaptionSource::new().with_video(
            "ABC123",
            vec![
                CaptionRecord::new("Intro", 0.0, 2.0),
                CaptionRecord::new("Apple Watch review", 1796.0, 4.0),
            ],
        );

        let records = source.fetch("ABC123", &["en".to_string()]).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].start, 1796.0);

        let missing = source.fetch("XYZ", &[]).await;
        assert!(matches!(missing, Err(ScoperError::AdapterFailure(_))));
    }
}
