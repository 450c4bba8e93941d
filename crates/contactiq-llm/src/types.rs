//! Provider identifiers and the extraction outcome union.

use contactiq_core::{ContactDraft, ExtractionMethod};
use serde::{Deserialize, Serialize};

/// External text-generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Anthropic,
    Groq,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAI => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Groq => write!(f, "groq"),
        }
    }
}

/// Why the extraction stage produced no drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// No provider credential configured.
    NoProvider,
    /// Provider call failed on both the full and the minimal prompt.
    ProviderFailed(String),
    /// A response arrived but nothing recoverable was in it.
    Unparseable,
}

/// Result-or-fallback union for the extraction stage. Failures are values,
/// not exceptions; the fusion stage decides what to do with `Empty`.
#[derive(Debug, Clone)]
pub enum LlmOutcome {
    Extracted {
        drafts: Vec<ContactDraft>,
        method: ExtractionMethod,
    },
    Empty {
        reason: EmptyReason,
    },
}

impl LlmOutcome {
    pub fn drafts(self) -> Vec<ContactDraft> {
        match self {
            LlmOutcome::Extracted { drafts, .. } => drafts,
            LlmOutcome::Empty { .. } => Vec::new(),
        }
    }

    pub fn method(&self) -> Option<ExtractionMethod> {
        match self {
            LlmOutcome::Extracted { method, .. } => Some(*method),
            LlmOutcome::Empty { .. } => None,
        }
    }
}

/// Error from one provider invocation.
#[derive(Debug)]
pub enum ProviderError {
    Timeout,
    Transport(String),
    Api { status: u16, body: String },
    EmptyResponse,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Timeout => write!(f, "provider call timed out"),
            ProviderError::Transport(e) => write!(f, "transport error: {}", e),
            ProviderError::Api { status, body } => write!(f, "API error {}: {}", status, body),
            ProviderError::EmptyResponse => write!(f, "provider returned an empty response"),
        }
    }
}
