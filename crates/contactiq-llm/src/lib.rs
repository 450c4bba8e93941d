//! Structured contact extraction via external providers (OpenAI, Anthropic,
//! Groq), with a cascading repair strategy for malformed model output.

pub mod client;
pub mod config;
pub mod parse;
pub mod prompt;
pub mod providers;
pub mod types;

pub use client::ExtractionClient;
pub use config::{ProviderConfig, ProviderConfigUpdate};
pub use types::{EmptyReason, LlmOutcome, Provider};
