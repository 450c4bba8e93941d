//! Error types for ContactIQ.
//!
//! Pipeline stages convert failures into fallback values at their own
//! boundary; these errors are for the genuinely fatal paths (startup
//! configuration, IO) and for collaborator contracts that need a typed error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
