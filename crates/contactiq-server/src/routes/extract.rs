//! Extraction routes — synchronous text/upload paths and the async image
//! job path.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use contactiq_ingest::{extract_text, parse_csv_contacts, parse_vcard_contacts, FileType};

use crate::jobs::now_millis;
use crate::state::{AppState, OcrJob, OcrRequest, OcrStatus};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/extract/text", post(extract_from_text))
        .route("/extract/upload", post(extract_from_upload))
        .route("/extract/image", post(extract_from_image))
        .route("/extract/status/{job_id}", get(job_status))
}

#[derive(Debug, Deserialize)]
struct TextRequest {
    text: String,
    #[serde(rename = "fileType")]
    file_type: Option<String>,
}

/// POST /api/extract/text — run the full chain over raw text.
async fn extract_from_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> Json<serde_json::Value> {
    let file_type = req.file_type.as_deref().unwrap_or("text");
    let output = state.pipeline.process_text(&req.text, file_type).await;
    Json(serde_json::to_value(&output).unwrap_or_default())
}

/// POST /api/extract/upload — multipart; text formats run synchronously,
/// small images run under the sync budget, large images are redirected to
/// the async endpoint.
async fn extract_from_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut results = Vec::new();
    let mut errors = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let filename = match field.file_name() {
            Some(name) => sanitize_filename(name),
            None => continue,
        };

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                errors.push(serde_json::json!({
                    "filename": filename,
                    "error": format!("Read failed: {}", e),
                }));
                continue;
            }
        };

        store_upload(&state, &filename, &bytes);

        let file_type = FileType::from_filename(&filename);
        if file_type.is_image() {
            if bytes.len() as u64 > state.config.sync_image_limit_bytes {
                errors.push(serde_json::json!({
                    "filename": filename,
                    "error": "Image too large for synchronous processing, use /api/extract/image",
                }));
                continue;
            }
            let budget = Duration::from_secs(state.config.sync_ocr_budget_secs);
            let output = state.pipeline.process_image(&bytes, budget).await;
            results.push(file_result(&filename, file_type, &output));
            continue;
        }

        let text = extract_text(&bytes, file_type);
        let output = match file_type {
            FileType::Csv => {
                let drafts = parse_csv_contacts(&bytes);
                if drafts.is_empty() {
                    state.pipeline.process_text(&text, file_type.label()).await
                } else {
                    state.pipeline.process_structured(drafts, &text).await
                }
            }
            FileType::VCard => {
                let drafts = parse_vcard_contacts(&bytes);
                if drafts.is_empty() {
                    state.pipeline.process_text(&text, file_type.label()).await
                } else {
                    state.pipeline.process_structured(drafts, &text).await
                }
            }
            _ => state.pipeline.process_text(&text, file_type.label()).await,
        };
        results.push(file_result(&filename, file_type, &output));
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "results": results,
            "errors": errors,
        })),
    )
}

/// POST /api/extract/image — queue an async OCR job.
async fn extract_from_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Ok(Some(field)) = multipart.next_field().await {
        let filename = match field.file_name() {
            Some(name) => sanitize_filename(name),
            None => continue,
        };

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": format!("Read failed: {}", e) })),
                );
            }
        };

        let job_id = uuid::Uuid::new_v4().to_string();
        let job = OcrJob {
            id: job_id.clone(),
            filename: filename.clone(),
            status: OcrStatus::Queued,
            result: None,
            error: None,
            queued_at: now_millis(),
            started_at: None,
            completed_at: None,
        };
        state.ocr_jobs.write().insert(job_id.clone(), job);

        let _ = state.job_tx.send(OcrRequest {
            job_id: job_id.clone(),
            filename: filename.clone(),
            bytes: bytes.to_vec(),
        });

        info!("Queued OCR job {} for {}", job_id, filename);

        return (
            StatusCode::OK,
            Json(serde_json::json!({
                "jobId": job_id,
                "status": "queued",
            })),
        );
    }

    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "No file in request" })),
    )
}

/// GET /api/extract/status/{job_id} — poll an async job.
async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let jobs = state.ocr_jobs.read();
    match jobs.get(&job_id) {
        Some(job) => (
            StatusCode::OK,
            Json(serde_json::to_value(job).unwrap_or_default()),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("Unknown job: {}", job_id) })),
        ),
    }
}

fn file_result(
    filename: &str,
    file_type: FileType,
    output: &contactiq_pipeline::PipelineOutput,
) -> serde_json::Value {
    serde_json::json!({
        "filename": filename,
        "fileType": file_type.label(),
        "contacts": output.contacts,
        "metadata": output.metadata,
    })
}

/// Keep an audit copy of each upload. Processing does not depend on this
/// write succeeding.
fn store_upload(state: &AppState, filename: &str, bytes: &[u8]) {
    let path = state.config.data_paths.uploads.join(filename);
    if let Err(e) = std::fs::write(&path, bytes) {
        warn!("Failed to store upload {}: {}", filename, e);
    }
}

fn sanitize_filename(name: &str) -> String {
    let name = name.replace('/', "").replace('\\', "").replace("..", "");

    std::path::Path::new(&name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename("card.png"), "card.png");
        assert_eq!(sanitize_filename("a/b\\c.txt"), "abc.txt");
    }
}
