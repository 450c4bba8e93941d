//! ContactIQ Ingest — container-format text extraction and entity recognition.

pub mod file;
pub mod recognize;

pub use file::{extract_text, parse_csv_contacts, parse_vcard_contacts, FileType};
pub use recognize::recognize;
