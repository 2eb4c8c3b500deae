//! Query orchestrator for Scoper.
//!
//! Coordinates a search from video URL to ranked, formatted captions.

use crate::caption_source::{extract_video_id, CaptionSource, YoutubeCaptionSource};
use crate::config::Settings;
use crate::embedding::{bootstrap, CorpusSource, VocabularyIndex};
use crate::error::Result;
use crate::ranking::SearchMode;
use crate::transcript::{format_duration, RankedCaption, Transcript};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The main entry point for caption search.
///
/// Construction builds the embedding model; once a `Scoper` exists its
/// vocabulary never changes, so it can be shared across concurrent queries.
pub struct Scoper {
    settings: Settings,
    source: Arc<dyn CaptionSource>,
    vocabulary: Arc<VocabularyIndex>,
}

impl Scoper {
    /// Create a scoper with the YouTube caption source and the configured model.
    pub fn new(settings: Settings) -> Result<Self> {
        let corpus = CorpusSource::from_settings(&settings)?;
        info!("Building embedding model from {}", corpus);
        let vocabulary = Arc::new(bootstrap(&corpus, &settings.embedding)?);

        let source: Arc<dyn CaptionSource> = Arc::new(YoutubeCaptionSource::new(&settings.captions)?);

        Ok(Self {
            settings,
            source,
            vocabulary,
        })
    }

    /// Create a scoper with custom components.
    pub fn with_components(
        settings: Settings,
        source: Arc<dyn CaptionSource>,
        vocabulary: Arc<VocabularyIndex>,
    ) -> Self {
        Self {
            settings,
            source,
            vocabulary,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a reference to the vocabulary.
    pub fn vocabulary(&self) -> Arc<VocabularyIndex> {
        self.vocabulary.clone()
    }

    /// Fetch a video's captions as a transcript.
    ///
    /// An unrecognizable URL is an error. A failed fetch is not: it is logged
    /// and yields an empty transcript.
    #[instrument(skip(self, languages), fields(source = self.source.name()))]
    pub async fn fetch_transcript(&self, video: &str, languages: &[String]) -> Result<Transcript> {
        let video_id = extract_video_id(video)?;

        let languages: &[String] = if languages.is_empty() {
            &self.settings.captions.languages
        } else {
            languages
        };

        match self.source.fetch(&video_id, languages).await {
            Ok(records) => {
                let transcript = Transcript::from_records(records);
                info!("Fetched {} captions for {}", transcript.len(), video_id);
                Ok(transcript)
            }
            Err(e) => {
                warn!("No captions available for {}: {}", video_id, e);
                Ok(Transcript::new())
            }
        }
    }

    /// Search a video's captions.
    ///
    /// Returns at most `limit` captions, most relevant first. A limit of zero or
    /// less, or a video without captions, yields no results.
    #[instrument(skip(self, languages))]
    pub async fn search(
        &self,
        video: &str,
        query: &str,
        limit: i64,
        languages: &[String],
        mode: SearchMode,
    ) -> Result<Vec<RankedCaption>> {
        let transcript = self.fetch_transcript(video, languages).await?;
        self.rank_transcript(&transcript, query, limit, mode)
    }

    /// Rank the captions of an already fetched transcript.
    pub fn rank_transcript(
        &self,
        transcript: &Transcript,
        query: &str,
        limit: i64,
        mode: SearchMode,
    ) -> Result<Vec<RankedCaption>> {
        let query = query.to_lowercase();
        let limit = usize::try_from(limit).unwrap_or(0);
        let ranker = mode.ranker(&self.vocabulary);

        let candidates = transcript.captions();
        let ranked = ranker.rank(&query, &candidates, limit)?;
        debug!("{} ranked {} of {} captions", mode, ranked.len(), candidates.len());

        Ok(ranked
            .into_iter()
            .filter_map(|caption| {
                let start = transcript.start_of(caption)?;
                Some(RankedCaption {
                    caption: caption.to_string(),
                    start_seconds: start,
                    duration: format_duration(start),
                })
            })
            .collect())
    }
}
