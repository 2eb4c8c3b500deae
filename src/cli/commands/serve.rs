//! Web interface and JSON API.
//!
//! Serves a single-page search form plus a JSON endpoint for programmatic use.

use crate::caption_source::extract_video_id;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Scoper;
use crate::ranking::SearchMode;
use crate::transcript::{compact_duration, RankedCaption};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const FORM_ERROR: &str = "please enter proper values in the form";

/// Shared application state.
struct AppState {
    scoper: Scoper,
}

/// Run the web server.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.port);

    // The model must be ready before the first request is accepted.
    let spinner = Output::spinner("Please wait, loading instance...");
    let scoper = Scoper::new(settings);
    spinner.finish_and_clear();
    let state = Arc::new(AppState { scoper: scoper? });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Scoper");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Search form", "GET  /");
    Output::kv("Search (JSON)", "POST /api/search");
    Output::kv("Health", "GET  /health");
    println!();
    let vocabulary = state.scoper.vocabulary();
    Output::kv(
        "Semantic model",
        &format!("{} words, {} dimensions", vocabulary.len(), vocabulary.dimensions()),
    );
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index).post(index_submit))
        .route("/api/search", post(api_search))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Debug, Default, Deserialize)]
struct SearchForm {
    #[serde(default)]
    youtube_link: String,
    #[serde(default)]
    algorithm: String,
    #[serde(default)]
    limit: String,
    #[serde(default)]
    query: String,
}

#[derive(Deserialize)]
struct SearchRequest {
    video: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    languages: Vec<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    video_id: String,
    mode: SearchMode,
    results: Vec<SearchResult>,
}

#[derive(Serialize)]
struct SearchResult {
    caption: String,
    start_seconds: f64,
    duration: String,
    url: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// What the form page shows below the form.
enum PageView<'a> {
    Empty,
    Error(&'a str),
    Results {
        video_link: &'a str,
        video_id: &'a str,
        results: &'a [RankedCaption],
    },
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn index() -> Html<String> {
    Html(render_page(PageView::Empty))
}

async fn index_submit(State(state): State<Arc<AppState>>, Form(form): Form<SearchForm>) -> Html<String> {
    let link = form.youtube_link.trim();
    let algorithm = form.algorithm.trim();
    let limit = form.limit.trim();

    if link.is_empty() || algorithm.is_empty() || limit.is_empty() {
        return Html(render_page(PageView::Error(FORM_ERROR)));
    }

    let Ok(limit) = limit.parse::<i64>() else {
        return Html(render_page(PageView::Error(FORM_ERROR)));
    };

    let outcome = async {
        let mode = algorithm.parse::<SearchMode>()?;
        let video_id = extract_video_id(link)?;
        let languages = state.scoper.settings().captions.languages.clone();
        let results = state
            .scoper
            .search(link, &form.query, limit, &languages, mode)
            .await?;
        Ok::<_, crate::error::ScoperError>((video_id, results))
    }
    .await;

    match outcome {
        Ok((video_id, results)) => {
            info!("Form search for {} returned {} captions", video_id, results.len());
            Html(render_page(PageView::Results {
                video_link: link,
                video_id: &video_id,
                results: &results,
            }))
        }
        Err(e) => {
            warn!("Form search failed: {}", e);
            Html(render_page(PageView::Error(&e.to_string())))
        }
    }
}

async fn api_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let settings = state.scoper.settings();

    let outcome = async {
        let mode = match req.mode.as_deref() {
            Some(m) => m.parse::<SearchMode>()?,
            None => settings.search.mode,
        };
        let video_id = extract_video_id(&req.video)?;
        let limit = req.limit.unwrap_or(settings.search.limit);
        let results = state
            .scoper
            .search(&req.video, &req.query, limit, &req.languages, mode)
            .await?;
        Ok::<_, crate::error::ScoperError>((video_id, mode, results))
    }
    .await;

    match outcome {
        Ok((video_id, mode, results)) => Json(SearchResponse {
            results: results
                .into_iter()
                .map(|r| SearchResult {
                    url: r.url_with_timestamp(&video_id),
                    caption: r.caption,
                    start_seconds: r.start_seconds,
                    duration: r.duration,
                })
                .collect(),
            video_id,
            mode,
        })
        .into_response(),
        Err(e) => {
            let status = if e.is_user_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

// === Rendering ===

fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_page(view: PageView<'_>) -> String {
    let body = match view {
        PageView::Empty => String::new(),
        PageView::Error(message) => {
            format!("<p class=\"error\">{}</p>", html_escape(message))
        }
        PageView::Results {
            video_link,
            video_id,
            results,
        } => render_results(video_link, video_id, results),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Scoper</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
label {{ display: block; margin-top: 0.5rem; }}
.error {{ color: #b00020; }}
table {{ border-collapse: collapse; margin-top: 1rem; width: 100%; }}
td {{ padding: 0.25rem 0.5rem; border-bottom: 1px solid #ddd; }}
</style>
</head>
<body>
<h1>Scoper</h1>
<form method="post" action="/">
<label>YouTube link <input type="text" name="youtube_link" size="50"></label>
<label>Algorithm
<select name="algorithm">
<option value="FUZZY">Fuzzy</option>
<option value="SEMANTIC">Semantic</option>
</select>
</label>
<label>Limit <input type="number" name="limit" value="10"></label>
<label>Query <input type="text" name="query" size="50"></label>
<button type="submit">Search</button>
</form>
{}
</body>
</html>
"#,
        body
    )
}

fn render_results(video_link: &str, video_id: &str, results: &[RankedCaption]) -> String {
    if results.is_empty() {
        return format!(
            "<p>No matching captions in <a href=\"{0}\">{0}</a>.</p>",
            html_escape(video_link)
        );
    }

    let rows: String = results
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td><a href=\"{}\">{}</a></td></tr>\n",
                html_escape(&r.caption),
                html_escape(&r.url_with_timestamp(video_id)),
                html_escape(&compact_duration(&r.duration))
            )
        })
        .collect();

    format!(
        "<p>Results for <a href=\"{0}\">{0}</a></p>\n<table>\n{1}</table>",
        html_escape(video_link),
        rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption_source::MemoryCaptionSource;
    use crate::embedding::VocabularyIndex;
    use crate::transcript::CaptionRecord;

    fn state() -> Arc<AppState> {
        let source = MemoryCaptionSource::new().with_video(
            "ABC123",
            vec![
                CaptionRecord::new("Apple Watch review", 1796.0, 3.0),
                CaptionRecord::new("Intro", 0.0, 5.0),
            ],
        );
        let vocabulary = VocabularyIndex::from_vectors(vec![
            ("apple".to_string(), vec![1.0, 0.0]),
            ("intro".to_string(), vec![0.0, 1.0]),
        ])
        .unwrap();

        Arc::new(AppState {
            scoper: Scoper::with_components(Settings::default(), Arc::new(source), Arc::new(vocabulary)),
        })
    }

    fn form(link: &str, algorithm: &str, limit: &str, query: &str) -> SearchForm {
        SearchForm {
            youtube_link: link.to_string(),
            algorithm: algorithm.to_string(),
            limit: limit.to_string(),
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let page = index().await.0;
        assert!(page.contains("name=\"youtube_link\""));
        assert!(!page.contains(FORM_ERROR));
    }

    #[tokio::test]
    async fn test_form_requires_link_algorithm_and_limit() {
        for (link, algorithm, limit) in [
            ("", "FUZZY", "5"),
            ("https://youtu.be/ABC123", "", "5"),
            ("https://youtu.be/ABC123", "FUZZY", " "),
            ("https://youtu.be/ABC123", "FUZZY", "many"),
        ] {
            let page = index_submit(State(state()), Form(form(link, algorithm, limit, "apple")))
                .await
                .0;
            assert!(page.contains(FORM_ERROR), "{:?}", (link, algorithm, limit));
        }
    }

    #[tokio::test]
    async fn test_form_results_use_compact_durations() {
        let page = index_submit(
            State(state()),
            Form(form("https://youtu.be/ABC123", "FUZZY", "1", "Apple Watch")),
        )
        .await
        .0;

        assert!(page.contains("apple watch review"));
        assert!(page.contains(">29m56s<"));
        assert!(page.contains("https://youtube.com/watch?v=ABC123&amp;t=1796s"));
        assert!(!page.contains(">intro<"));
    }

    #[tokio::test]
    async fn test_form_reports_unknown_mode() {
        let page = index_submit(
            State(state()),
            Form(form("https://youtu.be/ABC123", "BOGUS", "5", "apple")),
        )
        .await
        .0;
        assert!(page.contains("Unknown search mode: BOGUS"));
        assert!(!page.contains("<table>"));
    }

    #[tokio::test]
    async fn test_api_search_status_codes() {
        let ok = api_search(
            State(state()),
            Json(SearchRequest {
                video: "ABC123xyz_-".to_string(),
                query: "apple".to_string(),
                limit: Some(3),
                mode: Some("S".to_string()),
                languages: Vec::new(),
            }),
        )
        .await
        .into_response();
        assert_eq!(ok.status(), StatusCode::OK);

        let bad = api_search(
            State(state()),
            Json(SearchRequest {
                video: "https://example.com/nothing".to_string(),
                query: "apple".to_string(),
                limit: None,
                mode: None,
                languages: Vec::new(),
            }),
        )
        .await
        .into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }
}
