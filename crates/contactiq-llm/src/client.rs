//! The extraction client: one provider round-trip plus a single retry,
//! folded through the response repair cascade.

use std::time::Duration;

use contactiq_core::EntitySet;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::config::{ProviderConfig, ProviderConfigUpdate};
use crate::parse::parse_response;
use crate::prompt::{build_minimal_prompt, build_prompt, FULL_MAX_TOKENS, MINIMAL_MAX_TOKENS};
use crate::providers::complete;
use crate::types::{EmptyReason, LlmOutcome, Provider};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared handle over the HTTP client and the provider configuration.
/// Constructed once at startup and injected; config writes go through
/// [`ExtractionClient::update_config`].
pub struct ExtractionClient {
    http: reqwest::Client,
    config: RwLock<ProviderConfig>,
    request_timeout: Duration,
}

impl ExtractionClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: RwLock::new(config),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(config: ProviderConfig, request_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: RwLock::new(config),
            request_timeout,
        }
    }

    /// Masked view of the current configuration, safe to serialize.
    pub fn config_response(&self) -> serde_json::Value {
        self.config.read().to_response()
    }

    /// Apply a config update and persist it.
    pub fn update_config(
        &self,
        update: &ProviderConfigUpdate,
    ) -> contactiq_core::Result<serde_json::Value> {
        let mut config = self.config.write();
        config.apply_update(update);
        config.save()?;
        Ok(config.to_response())
    }

    pub fn has_provider(&self) -> bool {
        self.config.read().resolve_provider().is_some()
    }

    pub fn configured_providers(&self) -> Vec<&'static str> {
        self.config.read().configured_providers()
    }

    pub fn active_provider(&self) -> Option<String> {
        self.config
            .read()
            .resolve_provider()
            .map(|(p, _, _)| p.to_string())
    }

    /// Run one extraction. Never panics; the worst case is
    /// `Empty { reason }` after at most two bounded provider calls.
    pub async fn extract(
        &self,
        text: &str,
        entities: &EntitySet,
        file_type: &str,
    ) -> LlmOutcome {
        let resolved = self.config.read().resolve_provider();
        let Some((provider, model, api_key)) = resolved else {
            return LlmOutcome::Empty {
                reason: EmptyReason::NoProvider,
            };
        };

        let prompt = build_prompt(text, entities, file_type);
        let raw = match self
            .call(provider, &model, &api_key, &prompt, FULL_MAX_TOKENS)
            .await
        {
            Ok(raw) => raw,
            Err(first_err) => {
                warn!("Provider {} failed, retrying with minimal prompt: {}", provider, first_err);
                let retry_prompt = build_minimal_prompt(text);
                match self
                    .call(provider, &model, &api_key, &retry_prompt, MINIMAL_MAX_TOKENS)
                    .await
                {
                    Ok(raw) => raw,
                    Err(retry_err) => {
                        warn!("Provider {} retry failed: {}", provider, retry_err);
                        return LlmOutcome::Empty {
                            reason: EmptyReason::ProviderFailed(retry_err.to_string()),
                        };
                    }
                }
            }
        };

        match parse_response(&raw, entities) {
            Some((drafts, method)) => {
                info!("Model extraction produced {} drafts via {}", drafts.len(), method);
                LlmOutcome::Extracted { drafts, method }
            }
            None => LlmOutcome::Empty {
                reason: EmptyReason::Unparseable,
            },
        }
    }

    async fn call(
        &self,
        provider: Provider,
        model: &str,
        api_key: &str,
        prompt: &str,
        max_tokens: usize,
    ) -> Result<String, crate::types::ProviderError> {
        complete(
            &self.http,
            provider,
            model,
            api_key,
            prompt,
            max_tokens,
            self.request_timeout,
        )
        .await
    }
}
