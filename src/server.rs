//! HTTP server: the single-page upload UI and the summarize endpoint.
//!
//! Routes:
//! - `GET /` — inline HTML page with the upload form
//! - `POST /summarize` — multipart upload (`file` field), responds with the
//!   rendered summary PDF as an attachment
//! - `GET /health` — liveness probe
//!
//! Each upload is processed from scratch; there is no session state. The
//! response PDF is served from memory, and a copy is also written to the
//! fixed output path (`summary_output.pdf` by default) so the latest
//! result is inspectable on disk. Concurrent uploads race only on that
//! best-effort disk copy, never on the bytes a client receives.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::SummaryConfig;
use crate::error::SummarizeError;
use crate::pipeline::render::render_pdf;
use crate::summarize::summarize_bytes;

/// Fixed name of the rendered summary, both on disk and in the
/// `Content-Disposition` header.
pub const OUTPUT_FILENAME: &str = "summary_output.pdf";

/// Uploads above this size are rejected before buffering.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>PDF Summarizer with Technical Definitions</title>
<style>
  body { font-family: sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; }
  h1 { font-size: 1.4rem; }
  button { margin-top: 1rem; display: block; }
  #status { color: #555; min-height: 1.5rem; }
  .error { color: #b00020; }
</style>
</head>
<body>
<h1>PDF Summarizer with Technical Definitions</h1>
<form id="upload-form">
  <label for="file">Upload a PDF file</label><br>
  <input type="file" id="file" name="file" accept="application/pdf" required>
  <button type="submit">Download Summary PDF</button>
</form>
<p id="status"></p>
<script>
const form = document.getElementById("upload-form");
const statusEl = document.getElementById("status");
form.addEventListener("submit", async (event) => {
  event.preventDefault();
  statusEl.classList.remove("error");
  statusEl.textContent = "Processing...";
  try {
    const response = await fetch("/summarize", { method: "POST", body: new FormData(form) });
    if (!response.ok) {
      throw new Error(await response.text());
    }
    const blob = await response.blob();
    const link = document.createElement("a");
    link.href = URL.createObjectURL(blob);
    link.download = "summary_output.pdf";
    link.click();
    URL.revokeObjectURL(link.href);
    statusEl.textContent = "Done.";
  } catch (err) {
    statusEl.classList.add("error");
    statusEl.textContent = err.message;
  }
});
</script>
</body>
</html>
"#;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SummaryConfig>,
    pub output_path: Arc<PathBuf>,
}

impl AppState {
    /// State writing the disk copy to [`OUTPUT_FILENAME`] in the working
    /// directory.
    pub fn new(config: SummaryConfig) -> Self {
        Self::with_output_path(config, OUTPUT_FILENAME)
    }

    pub fn with_output_path(config: SummaryConfig, output_path: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            output_path: Arc::new(output_path.into()),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/summarize", post(summarize_handler))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the task is cancelled.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pdf-summarizer",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn summarize_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut upload: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("malformed multipart body: {}", e),
        )
    })? {
        if field.name() == Some("file") {
            let data = field.bytes().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("failed to read upload: {}", e),
                )
            })?;
            upload = Some(data);
        }
    }

    let bytes = upload.ok_or((
        StatusCode::BAD_REQUEST,
        "missing 'file' field in upload".to_string(),
    ))?;
    if !bytes.starts_with(b"%PDF") {
        return Err((
            StatusCode::BAD_REQUEST,
            "upload is not a PDF (missing %PDF header)".to_string(),
        ));
    }

    info!("Upload received: {} bytes", bytes.len());
    let output = summarize_bytes(&bytes, &state.config)
        .await
        .map_err(error_status)?;
    let pdf = render_pdf(&output.report).map_err(error_status)?;

    // The disk copy is best effort; the response itself serves from memory.
    if let Err(e) = tokio::fs::write(state.output_path.as_ref(), &pdf).await {
        warn!("Failed to write '{}': {}", state.output_path.display(), e);
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
            ),
        ],
        pdf,
    ))
}

/// Map pipeline errors onto HTTP statuses: problems with the upload are the
/// client's fault, everything else is ours.
fn error_status(err: SummarizeError) -> (StatusCode, String) {
    let status = match err {
        SummarizeError::InvalidPdf { .. }
        | SummarizeError::EncryptedPdf
        | SummarizeError::NotAPdf { .. }
        | SummarizeError::ExtractionFailed { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_page_carries_the_ui_strings() {
        assert!(INDEX_HTML.contains("PDF Summarizer with Technical Definitions"));
        assert!(INDEX_HTML.contains("Upload a PDF file"));
        assert!(INDEX_HTML.contains("Processing..."));
        assert!(INDEX_HTML.contains("Download Summary PDF"));
        assert!(INDEX_HTML.contains(r#"name="file""#));
        assert!(INDEX_HTML.contains(r#"accept="application/pdf""#));
    }

    #[test]
    fn upload_errors_map_to_bad_request() {
        let (status, _) = error_status(SummarizeError::EncryptedPdf);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_status(SummarizeError::InvalidPdf {
            detail: "truncated".to_string(),
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_map_to_500() {
        let (status, _) = error_status(SummarizeError::ApiKeyMissing);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = error_status(SummarizeError::RenderFailed {
            detail: "boom".to_string(),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
