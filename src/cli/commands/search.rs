//! Search command implementation.

use crate::caption_source::extract_video_id;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Scoper;
use crate::ranking::SearchMode;
use crate::transcript::Transcript;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the search command.
pub async fn run_search(
    video: Option<&str>,
    mode: Option<&str>,
    limit: Option<i64>,
    languages: &[String],
    query: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let Some(video) = video else {
        println!("No video URL found.");
        return Ok(());
    };

    let video_id = extract_video_id(video)?;
    let mode = match mode {
        Some(m) => m.parse::<SearchMode>()?,
        None => settings.search.mode,
    };
    let limit = limit.unwrap_or(settings.search.limit);

    let spinner = Output::spinner("Building embedding model...");
    let scoper = Scoper::new(settings);
    spinner.finish_and_clear();
    let scoper = scoper?;

    let spinner = Output::spinner("Fetching captions...");
    let transcript = scoper.fetch_transcript(video, languages).await;
    spinner.finish_and_clear();
    let transcript = transcript?;

    if transcript.is_empty() {
        Output::warning(&format!("No captions found for {}", video_id));
    }

    match query {
        Some(query) => {
            let results = scoper.rank_transcript(&transcript, query, limit, mode)?;
            Output::results(&results, &video_id);
        }
        None => interactive(&scoper, &transcript, &video_id, limit, mode)?,
    }

    Ok(())
}

/// Read queries from stdin until `exit`, `quit` or end of input.
fn interactive(
    scoper: &Scoper,
    transcript: &Transcript,
    video_id: &str,
    limit: i64,
    mode: SearchMode,
) -> Result<()> {
    println!(
        "{}\n",
        style(format!("Searching {} in {} mode. Type 'exit' to quit.", video_id, mode)).dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("Enter query string:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        match scoper.rank_transcript(transcript, input, limit, mode) {
            Ok(results) => Output::results(&results, video_id),
            Err(e) => Output::error(&e.to_string()),
        }
        println!();
    }

    Ok(())
}
