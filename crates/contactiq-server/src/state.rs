//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use contactiq_core::ContactIqConfig;
use contactiq_pipeline::{Pipeline, PipelineOutput};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Asynchronous OCR job record.
#[derive(Debug, Clone, Serialize)]
pub struct OcrJob {
    pub id: String,
    pub filename: String,
    pub status: OcrStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PipelineOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub queued_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OcrStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// A request handed to the background OCR worker.
pub struct OcrRequest {
    pub job_id: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ContactIqConfig,
    pub pipeline: Arc<Pipeline>,
    pub ocr_jobs: RwLock<HashMap<String, OcrJob>>,
    pub job_tx: mpsc::UnboundedSender<OcrRequest>,
    job_rx: parking_lot::Mutex<Option<mpsc::UnboundedReceiver<OcrRequest>>>,
}

impl AppState {
    pub fn new(config: ContactIqConfig, pipeline: Arc<Pipeline>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            pipeline,
            ocr_jobs: RwLock::new(HashMap::new()),
            job_tx: tx,
            job_rx: parking_lot::Mutex::new(Some(rx)),
        }
    }

    /// Take the job receiver (can only be called once, by the worker).
    pub fn take_job_rx(&self) -> Option<mpsc::UnboundedReceiver<OcrRequest>> {
        self.job_rx.lock().take()
    }

    /// Jobs not yet finished, reported by the health endpoint.
    pub fn queue_size(&self) -> usize {
        self.ocr_jobs
            .read()
            .values()
            .filter(|j| j.status == OcrStatus::Queued || j.status == OcrStatus::Processing)
            .count()
    }
}
