//! Timestamp and result formatting.

use super::{RankedCaption, Transcript};
use serde::Serialize;

/// Format an offset in seconds as "{h}h {m}m {s}s", dropping the hour segment
/// below one hour.
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}

/// Remove all whitespace from a duration label ("29m 56s" -> "29m56s").
pub fn compact_duration(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Render ranked captions as aligned `caption  duration` rows.
pub fn format_table(results: &[RankedCaption]) -> String {
    let width = results
        .iter()
        .map(|r| r.caption.chars().count())
        .max()
        .unwrap_or(0)
        + 5;

    results
        .iter()
        .map(|r| {
            let pad = width - r.caption.chars().count();
            format!("{}{}{}", r.caption, " ".repeat(pad), r.duration)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Supported transcript dump formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text or json.", s)),
        }
    }
}

#[derive(Debug, Serialize)]
struct CaptionExport<'a> {
    caption: &'a str,
    start_seconds: f64,
    timestamp: String,
}

/// Format a transcript for output.
pub fn format_transcript(transcript: &Transcript, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => transcript
            .iter()
            .map(|(caption, start)| format!("[{}] {}", format_duration(start), caption))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            let export: Vec<CaptionExport> = transcript
                .iter()
                .map(|(caption, start)| CaptionExport {
                    caption,
                    start_seconds: start,
                    timestamp: format_duration(start),
                })
                .collect();
            serde_json::to_string_pretty(&export).unwrap_or_else(|_| "[]".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0m 0s");
        assert_eq!(format_duration(59.9), "0m 59s");
        assert_eq!(format_duration(1796.0), "29m 56s");
        assert_eq!(format_duration(3600.0), "1h 0m 0s");
        assert_eq!(format_duration(3725.7), "1h 2m 5s");
    }

    #[test]
    fn test_hour_segment_only_from_one_hour() {
        for t in [0.0, 1.0, 600.5, 3599.0, 3599.999] {
            assert!(!format_duration(t).contains('h'), "{}", t);
        }
        for t in [3600.0, 3600.5, 7322.0, 86400.0] {
            assert!(format_duration(t).contains('h'), "{}", t);
        }
    }

    #[test]
    fn test_compact_duration() {
        assert_eq!(compact_duration("29m 56s"), "29m56s");
        assert_eq!(compact_duration("1h 2m 5s"), "1h2m5s");
    }

    #[test]
    fn test_format_table_aligns() {
        let results = vec![
            RankedCaption {
                caption: "short".to_string(),
                start_seconds: 1.0,
                duration: "0m 1s".to_string(),
            },
            RankedCaption {
                caption: "a longer caption".to_string(),
                start_seconds: 61.0,
                duration: "1m 1s".to_string(),
            },
        ];

        let table = format_table(&results);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].find("0m"), lines[1].find("1m"));
    }

    #[test]
    fn test_format_transcript_json() {
        let transcript: Transcript = vec![("intro".to_string(), 0.0)].into_iter().collect();
        let json = format_transcript(&transcript, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["caption"], "intro");
        assert_eq!(value[0]["timestamp"], "0m 0s");
    }
}
