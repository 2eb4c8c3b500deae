//! Captions command implementation.

use crate::caption_source::{extract_video_id, CaptionSource, YoutubeCaptionSource};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::{format_transcript, OutputFormat, Transcript};
use anyhow::Result;

/// Fetch a video's captions and print them.
///
/// Unlike a search, a failed fetch is reported as an error here.
pub async fn run_captions(
    video: &str,
    languages: &[String],
    format: &str,
    settings: Settings,
) -> Result<()> {
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let video_id = extract_video_id(video)?;

    let languages = if languages.is_empty() {
        settings.captions.languages.clone()
    } else {
        languages.to_vec()
    };

    let source = YoutubeCaptionSource::new(&settings.captions)?;

    let spinner = Output::spinner(&format!("Fetching captions for {}...", video_id));
    let records = source.fetch(&video_id, &languages).await;
    spinner.finish_and_clear();

    let transcript = Transcript::from_records(records?);
    println!("{}", format_transcript(&transcript, format));

    Ok(())
}
