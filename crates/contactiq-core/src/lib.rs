//! ContactIQ Core — contact data model, category taxonomy, configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ContactIqConfig, DataPaths};
pub use error::{Error, Result};
pub use types::{
    Category, ContactDraft, EntityKind, EntityMention, EntitySet, ExtractionMetadata,
    ExtractionMethod, ExtractionResult,
};
