//! YouTube caption source implementation.
//!
//! Captions are read from the watch page's player response: the
//! `captionTracks` list names one timed-text URL per available language.

use super::CaptionSource;
use crate::config::CaptionSettings;
use crate::error::{Result, ScoperError};
use crate::transcript::CaptionRecord;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::ACCEPT_LANGUAGE;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const WATCH_URL: &str = "https://www.youtube.com/watch";

/// One entry of the player response's `captionTracks` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    /// "asr" for auto-generated tracks.
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsRenderer {
    player_captions_tracklist_renderer: TracklistRenderer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

/// YouTube caption source.
pub struct YoutubeCaptionSource {
    client: reqwest::Client,
}

impl YoutubeCaptionSource {
    pub fn new(settings: &CaptionSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Download the watch page HTML.
    async fn fetch_watch_page(&self, video_id: &str) -> Result<String> {
        let url = Url::parse_with_params(WATCH_URL, &[("v", video_id)])
            .map_err(|e| ScoperError::InvalidInput(format!("Bad video ID {}: {}", video_id, e)))?;

        let html = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(html)
    }

    /// Download and parse one timed-text track.
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionRecord>> {
        let xml = self
            .client
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_timedtext(&xml))
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptionSource {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<CaptionRecord>> {
        let html = self.fetch_watch_page(video_id).await?;
        let tracks = extract_caption_tracks(&html, video_id)?;
        debug!(
            "Video {} has {} caption tracks: {:?}",
            video_id,
            tracks.len(),
            tracks.iter().map(|t| t.language_code.as_str()).collect::<Vec<_>>()
        );

        let track = select_track(&tracks, languages).ok_or_else(|| {
            ScoperError::AdapterFailure(format!(
                "No captions for video {} in languages {:?}",
                video_id, languages
            ))
        })?;

        info!(
            "Fetching {} captions ({}) for {}",
            track.language_code,
            if track.is_generated() { "generated" } else { "manual" },
            video_id
        );

        self.fetch_track(track).await
    }
}

/// Pull the `captionTracks` list out of the watch page's player response.
fn extract_caption_tracks(html: &str, video_id: &str) -> Result<Vec<CaptionTrack>> {
    let Some((_, after)) = html.split_once("\"captions\":") else {
        let reason = if html.contains("class=\"g-recaptcha\"") {
            "too many requests, YouTube is asking for a captcha"
        } else if !html.contains("\"playabilityStatus\":") {
            "video is unavailable"
        } else {
            "captions are disabled"
        };
        return Err(ScoperError::AdapterFailure(format!("{}: {}", video_id, reason)));
    };

    let json = after
        .split(",\"videoDetails")
        .next()
        .unwrap_or_default()
        .replace('\n', "");

    let renderer: CaptionsRenderer = serde_json::from_str(&json).map_err(|e| {
        ScoperError::AdapterFailure(format!("{}: unexpected caption metadata: {}", video_id, e))
    })?;

    Ok(renderer.player_captions_tracklist_renderer.caption_tracks)
}

/// Pick the first requested language that has a track, preferring manual
/// captions over generated ones within a language.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut candidates = tracks.iter().filter(|t| &t.language_code == lang);
        let manual = candidates.clone().find(|t| !t.is_generated());
        manual.or_else(|| candidates.next())
    })
}

fn text_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<text start="([\d.]+)"(?: dur="([\d.]+)")?[^>]*>(.*?)</text>"#)
            .expect("Invalid regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid regex"))
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("Invalid regex"))
}

/// Parse a timed-text XML document into caption records.
fn parse_timedtext(xml: &str) -> Vec<CaptionRecord> {
    text_element_regex()
        .captures_iter(xml)
        .filter_map(|caps| {
            let start = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let duration = caps
                .get(2)
                .and_then(|d| d.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);

            // Timed text is XML-escaped HTML: decode the XML layer, drop the
            // markup, then decode the HTML layer so escaped `<` and `>` survive.
            let html = decode_entities(caps.get(3)?.as_str());
            let text = decode_entities(&tag_regex().replace_all(&html, ""));
            let text = text.trim();
            if text.is_empty() {
                return None;
            }

            Some(CaptionRecord::new(text, start, duration))
        })
        .collect()
}

/// Decode named and numeric character references.
fn decode_entities(input: &str) -> String {
    entity_regex()
        .replace_all(input, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.test/{}/{}", lang, kind.unwrap_or("manual")),
            language_code: lang.to_string(),
            kind: kind.map(String::from),
        }
    }

    #[test]
    fn test_select_track_prefers_manual_in_language_order() {
        let tracks = vec![
            track("en", Some("asr")),
            track("de", None),
            track("en", None),
        ];

        let picked = select_track(&tracks, &["en".to_string(), "de".to_string()]).unwrap();
        assert_eq!(picked.language_code, "en");
        assert!(!picked.is_generated());

        let picked = select_track(&tracks, &["fr".to_string(), "de".to_string()]).unwrap();
        assert_eq!(picked.language_code, "de");

        let generated_only = vec![track("en", Some("asr"))];
        assert!(select_track(&generated_only, &["en".to_string()]).unwrap().is_generated());

        assert!(select_track(&tracks, &["fr".to_string()]).is_none());
    }

    #[test]
    fn test_extract_caption_tracks() {
        let html = r#"<script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=ABC&lang=en","name":{"simpleText":"English"},"languageCode":"en","kind":"asr"}]}},"videoDetails":{"videoId":"ABC"}};</script>"#;

        let tracks = extract_caption_tracks(html, "ABC").unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language_code, "en");
        assert!(tracks[0].is_generated());
        assert_eq!(tracks[0].base_url, "https://www.youtube.com/api/timedtext?v=ABC&lang=en");
    }

    #[test]
    fn test_extract_caption_tracks_missing() {
        let disabled = r#"{"playabilityStatus":{"status":"OK"},"videoDetails":{}}"#;
        let err = extract_caption_tracks(disabled, "ABC").unwrap_err();
        assert!(err.to_string().contains("disabled"));

        let unavailable = "<html>nothing here</html>";
        let err = extract_caption_tracks(unavailable, "ABC").unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r##"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="1.54">Hey there</text><text start="2.04" dur="3">it&amp;#39;s <font color="#E5E5E5">Apple</font> &amp;amp; Watch</text><text start="5.1" dur="1"></text><text start="6">no duration</text></transcript>"##;

        let records = parse_timedtext(xml);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], CaptionRecord::new("Hey there", 0.5, 1.54));
        assert_eq!(records[1].text, "it's Apple & Watch");
        assert_eq!(records[1].start, 2.04);
        assert_eq!(records[2].duration, 0.0);
    }

    #[test]
    fn test_parse_timedtext_keeps_escaped_angle_brackets() {
        let xml = r##"<transcript><text start="1" dur="2">if a &amp;lt; b &amp;gt; c</text><text start="3" dur="1">&lt;font color=&quot;#CCCCCC&quot;&gt;x &amp;lt;= y&lt;/font&gt;</text></transcript>"##;

        let records = parse_timedtext(xml);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "if a < b > c");
        assert_eq!(records[1].text, "x <= y");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &#65;&#x42; &bogus;"), "a <b> AB &bogus;");
    }
}
