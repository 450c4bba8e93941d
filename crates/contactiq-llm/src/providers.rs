//! Non-streaming completion calls to external providers.
//!
//! OpenAI and Groq share a wire format; Anthropic uses the Messages API.
//! Every call is bounded by an explicit deadline; an overrun is reported as
//! `ProviderError::Timeout`, never as a hang.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::types::{Provider, ProviderError};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// One completion request against the given provider.
pub async fn complete(
    client: &Client,
    provider: Provider,
    model: &str,
    api_key: &str,
    prompt: &str,
    max_tokens: usize,
    deadline: Duration,
) -> Result<String, ProviderError> {
    let fut = async {
        match provider {
            Provider::OpenAI => {
                complete_openai_compat(client, OPENAI_URL, model, api_key, prompt, max_tokens).await
            }
            Provider::Groq => {
                complete_openai_compat(client, GROQ_URL, model, api_key, prompt, max_tokens).await
            }
            Provider::Anthropic => {
                complete_anthropic(client, model, api_key, prompt, max_tokens).await
            }
        }
    };

    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout),
    }
}

async fn complete_openai_compat(
    client: &Client,
    url: &str,
    model: &str,
    api_key: &str,
    prompt: &str,
    max_tokens: usize,
) -> Result<String, ProviderError> {
    let body = json!({
        "model": model,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": 0.1,
        "max_tokens": max_tokens,
    });

    debug!("Requesting completion from {} with model {}", url, model);

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api { status, body });
    }

    let parsed: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    extract_text(&parsed["choices"][0]["message"]["content"])
}

async fn complete_anthropic(
    client: &Client,
    model: &str,
    api_key: &str,
    prompt: &str,
    max_tokens: usize,
) -> Result<String, ProviderError> {
    let body = json!({
        "model": model,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": 0.1,
        "max_tokens": max_tokens,
    });

    debug!("Requesting completion from Anthropic with model {}", model);

    let response = client
        .post(ANTHROPIC_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api { status, body });
    }

    let parsed: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    extract_text(&parsed["content"][0]["text"])
}

fn extract_text(value: &serde_json::Value) -> Result<String, ProviderError> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(ProviderError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_rejects_empty() {
        assert!(matches!(
            extract_text(&json!("")),
            Err(ProviderError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(&json!(null)),
            Err(ProviderError::EmptyResponse)
        ));
        assert_eq!(extract_text(&json!("[]")).unwrap(), "[]");
    }
}
