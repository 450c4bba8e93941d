//! Background OCR queue — processes large images asynchronously.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::state::{AppState, OcrStatus};

/// Start the background OCR worker task.
pub fn start_ocr_worker(state: Arc<AppState>) {
    let mut rx = match state.take_job_rx() {
        Some(rx) => rx,
        None => {
            error!("OCR worker already started");
            return;
        }
    };

    tokio::spawn(async move {
        info!("Background OCR worker started");
        while let Some(request) = rx.recv().await {
            process_ocr_job(&state, &request.job_id, &request.filename, &request.bytes).await;
        }
    });
}

async fn process_ocr_job(state: &AppState, job_id: &str, filename: &str, bytes: &[u8]) {
    {
        let mut jobs = state.ocr_jobs.write();
        if let Some(job) = jobs.get_mut(job_id) {
            job.status = OcrStatus::Processing;
            job.started_at = Some(now_millis());
        }
    }

    info!("Processing OCR job {}: {}", job_id, filename);

    let budget = Duration::from_secs(state.config.async_ocr_budget_secs);
    let output = state.pipeline.process_image(bytes, budget).await;

    {
        let mut jobs = state.ocr_jobs.write();
        if let Some(job) = jobs.get_mut(job_id) {
            job.completed_at = Some(now_millis());
            if output.metadata.method == contactiq_core::ExtractionMethod::Failed {
                job.status = OcrStatus::Failed;
                job.error = Some("All OCR strategies exhausted".to_string());
            } else {
                job.status = OcrStatus::Completed;
            }
            job.result = Some(output);
        }
    }

    info!("OCR job {} finished", job_id);

    cleanup_old_jobs(state);
}

/// Keep at most 100 finished jobs; the oldest are evicted first.
fn cleanup_old_jobs(state: &AppState) {
    let mut jobs = state.ocr_jobs.write();
    let finished: Vec<String> = jobs
        .iter()
        .filter(|(_, j)| j.status == OcrStatus::Completed || j.status == OcrStatus::Failed)
        .map(|(id, _)| id.clone())
        .collect();

    if finished.len() > 100 {
        let mut to_remove: Vec<(String, i64)> = finished
            .iter()
            .filter_map(|id| {
                jobs.get(id)
                    .and_then(|j| j.completed_at)
                    .map(|t| (id.clone(), t))
            })
            .collect();
        to_remove.sort_by_key(|(_, t)| *t);
        let remove_count = to_remove.len() - 100;
        for (id, _) in to_remove.into_iter().take(remove_count) {
            jobs.remove(&id);
        }
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
