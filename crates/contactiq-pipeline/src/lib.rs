//! End-to-end extraction pipeline: recognize, extract, fuse, and the
//! multi-strategy OCR runner for image inputs.

pub mod ocr;
pub mod pipeline;

pub use ocr::{DisabledOcr, OcrEngine, OcrProfile, RemoteOcr};
pub use pipeline::{Pipeline, PipelineOutput};
