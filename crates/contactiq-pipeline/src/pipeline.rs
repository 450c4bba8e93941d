//! Pipeline orchestration: text goes recognize -> extract -> fuse, images
//! additionally walk the OCR strategy ladder and merge across strategies.

use std::sync::Arc;
use std::time::Duration;

use contactiq_core::{
    ContactDraft, EntitySet, ExtractionMetadata, ExtractionMethod, ExtractionResult,
};
use contactiq_fuse::merge_drafts;
use contactiq_llm::ExtractionClient;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::ocr::{OcrEngine, OcrProfile};

/// Per-strategy deadline never drops below this, whatever the budget.
const MIN_STRATEGY_SECS: u64 = 5;

/// Final product of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub contacts: Vec<ContactDraft>,
    pub metadata: ExtractionMetadata,
}

impl PipelineOutput {
    fn from_result(result: ExtractionResult, entities: &EntitySet, text_length: usize) -> Self {
        Self {
            metadata: ExtractionMetadata {
                confidence: result.confidence,
                method: result.method,
                entities_found_count: entities.total(),
                text_length,
            },
            contacts: result.drafts,
        }
    }

    fn empty(method: ExtractionMethod) -> Self {
        Self {
            contacts: Vec::new(),
            metadata: ExtractionMetadata {
                confidence: 0.0,
                method,
                entities_found_count: 0,
                text_length: 0,
            },
        }
    }
}

/// Long-lived orchestrator, constructed once at startup and shared.
pub struct Pipeline {
    client: Arc<ExtractionClient>,
    ocr: Arc<dyn OcrEngine>,
}

impl Pipeline {
    pub fn new(client: Arc<ExtractionClient>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self { client, ocr }
    }

    pub fn client(&self) -> &Arc<ExtractionClient> {
        &self.client
    }

    pub fn ocr_available(&self) -> bool {
        self.ocr.is_available()
    }

    /// Full chain for one text input. Blank text is a result, not an error.
    pub async fn process_text(&self, text: &str, file_type: &str) -> PipelineOutput {
        if text.trim().is_empty() {
            debug!("Blank input, returning empty result");
            return PipelineOutput::empty(ExtractionMethod::Failed);
        }

        let entities = contactiq_ingest::recognize(text);
        debug!("Recognized {} entities in {} chars", entities.total(), text.len());

        let outcome = self.client.extract(text, &entities, file_type).await;
        let (drafts, method) = match outcome {
            contactiq_llm::LlmOutcome::Extracted { drafts, method } => (drafts, method),
            contactiq_llm::LlmOutcome::Empty { reason } => {
                debug!("Model stage empty: {:?}", reason);
                (Vec::new(), ExtractionMethod::Failed)
            }
        };

        let result = contactiq_fuse::fuse(drafts, method, &entities, text);
        PipelineOutput::from_result(result, &entities, text.len())
    }

    /// Already-structured drafts (CSV, vCard) skip the model stage but
    /// still pass through fusion and validation.
    pub async fn process_structured(
        &self,
        drafts: Vec<ContactDraft>,
        original_text: &str,
    ) -> PipelineOutput {
        let entities = contactiq_ingest::recognize(original_text);
        let result = contactiq_fuse::fuse(
            drafts,
            ExtractionMethod::Structured,
            &entities,
            original_text,
        );
        PipelineOutput::from_result(result, &entities, original_text.len())
    }

    /// Walk the OCR strategy ladder under per-strategy deadlines, run each
    /// recognized text through the text chain, and merge the results.
    ///
    /// Strategy exhaustion is a result with method `failed`, not an error.
    pub async fn process_image(&self, image: &[u8], budget: Duration) -> PipelineOutput {
        let ladder = OcrProfile::ladder();
        let per_strategy = strategy_deadline(budget, ladder.len());

        let mut contributions: Vec<PipelineOutput> = Vec::new();

        for profile in &ladder {
            let text = match timeout(per_strategy, self.ocr.recognize(image, profile)).await {
                Ok(Ok(text)) => text,
                Ok(Err(err)) => {
                    warn!("OCR profile {} failed: {}", profile.name, err);
                    continue;
                }
                Err(_) => {
                    warn!(
                        "OCR profile {} timed out after {:?}",
                        profile.name, per_strategy
                    );
                    continue;
                }
            };

            if text.trim().is_empty() {
                debug!("OCR profile {} produced no text", profile.name);
                continue;
            }

            let output = self.process_text(&text, "image").await;
            if !output.contacts.is_empty() {
                contributions.push(output);
            }
        }

        if contributions.is_empty() {
            info!("All OCR strategies exhausted without contacts");
            return PipelineOutput::empty(ExtractionMethod::Failed);
        }

        let confidence = contributions
            .iter()
            .map(|o| o.metadata.confidence)
            .fold(0.0_f64, f64::max);
        let entities_found_count = contributions
            .iter()
            .map(|o| o.metadata.entities_found_count)
            .sum();
        let text_length = contributions.iter().map(|o| o.metadata.text_length).sum();

        let lists: Vec<Vec<ContactDraft>> =
            contributions.into_iter().map(|o| o.contacts).collect();
        let contacts = merge_drafts(lists);
        info!("Merged {} contacts across OCR strategies", contacts.len());

        PipelineOutput {
            contacts,
            metadata: ExtractionMetadata {
                confidence,
                method: ExtractionMethod::Merged,
                entities_found_count,
                text_length,
            },
        }
    }
}

fn strategy_deadline(budget: Duration, strategies: usize) -> Duration {
    let split = budget.as_secs() / strategies.max(1) as u64;
    Duration::from_secs(split.max(MIN_STRATEGY_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::DisabledOcr;
    use async_trait::async_trait;
    use contactiq_core::{Category, Result};
    use contactiq_llm::ProviderConfig;

    struct FixedOcr {
        per_profile: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl OcrEngine for FixedOcr {
        async fn recognize(&self, _image: &[u8], profile: &OcrProfile) -> Result<String> {
            Ok(self
                .per_profile
                .iter()
                .find(|(name, _)| *name == profile.name)
                .map(|(_, text)| text.to_string())
                .unwrap_or_default())
        }
    }

    fn offline_pipeline(ocr: Arc<dyn OcrEngine>) -> Pipeline {
        // No credentials: the model stage is skipped and the entity
        // recognizer carries the extraction.
        let config = ProviderConfig {
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            ..ProviderConfig::default()
        };
        Pipeline::new(Arc::new(ExtractionClient::new(config)), ocr)
    }

    #[tokio::test]
    async fn test_blank_text_short_circuits() {
        let pipeline = offline_pipeline(Arc::new(DisabledOcr));
        let output = pipeline.process_text("   \n ", "text").await;
        assert!(output.contacts.is_empty());
        assert_eq!(output.metadata.method, ExtractionMethod::Failed);
        assert_eq!(output.metadata.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_text_without_provider_uses_entity_fallback() {
        let pipeline = offline_pipeline(Arc::new(DisabledOcr));
        let text = "John Smith\nAcme Logistics Ltd\njohn@acme.com\nTel: +1 555 010 2345";
        let output = pipeline.process_text(text, "text").await;
        assert_eq!(output.metadata.method, ExtractionMethod::EntityFallback);
        assert_eq!(output.contacts.len(), 1);
        assert_eq!(output.contacts[0].email, "john@acme.com");
        assert!(output.metadata.entities_found_count > 0);
        assert_eq!(output.metadata.text_length, text.len());
    }

    #[tokio::test]
    async fn test_entity_fallback_business_card_fields() {
        let pipeline = offline_pipeline(Arc::new(DisabledOcr));
        let text = "John Doe\njohn@acme.com\n+1-555-000-1111\nAcme Corp";
        let output = pipeline.process_text(text, "text").await;
        assert_eq!(output.metadata.method, ExtractionMethod::EntityFallback);
        assert_eq!(output.contacts.len(), 1);
        let contact = &output.contacts[0];
        assert_eq!(contact.name, "John Doe");
        assert_eq!(contact.email, "john@acme.com");
        assert_eq!(contact.phone, "5550001111");
        assert_eq!(contact.company, "Acme Corp");
        assert_eq!(contact.categories, vec![Category::Others]);
    }

    #[tokio::test]
    async fn test_structured_drafts_bypass_model() {
        let pipeline = offline_pipeline(Arc::new(DisabledOcr));
        let drafts = vec![ContactDraft {
            name: "Jane Roe".into(),
            email: "jane@acme.com".into(),
            ..ContactDraft::default()
        }];
        let output = pipeline.process_structured(drafts, "Jane Roe, jane@acme.com").await;
        assert_eq!(output.metadata.method, ExtractionMethod::Structured);
        assert_eq!(output.contacts.len(), 1);
    }

    #[tokio::test]
    async fn test_image_merges_across_strategies() {
        let ocr = FixedOcr {
            per_profile: vec![
                ("fast", "J. Smith\njohn@acme.com"),
                ("enhanced", "John Smith\nAcme Logistics Ltd\njohn@acme.com"),
                ("fallback", ""),
            ],
        };
        let pipeline = offline_pipeline(Arc::new(ocr));
        let output = pipeline
            .process_image(b"fake-image", Duration::from_secs(60))
            .await;
        assert_eq!(output.metadata.method, ExtractionMethod::Merged);
        assert_eq!(output.contacts.len(), 1);
        assert_eq!(output.contacts[0].name, "John Smith");
    }

    #[tokio::test]
    async fn test_image_merge_combines_partial_reads() {
        // One strategy garbles the name but finds the email, one returns
        // nothing, one reads the name beside an unusable short number. The
        // merged result is a single draft with the best of each.
        let ocr = FixedOcr {
            per_profile: vec![
                ("fast", "J0hn Doe email@x.com"),
                ("enhanced", ""),
                ("fallback", "John Doe 555-1234"),
            ],
        };
        let pipeline = offline_pipeline(Arc::new(ocr));
        let output = pipeline
            .process_image(b"fake-image", Duration::from_secs(60))
            .await;
        assert_eq!(output.metadata.method, ExtractionMethod::Merged);
        assert_eq!(output.contacts.len(), 1);
        assert_eq!(output.contacts[0].name, "John Doe");
        assert_eq!(output.contacts[0].email, "email@x.com");
        assert_eq!(output.contacts[0].phone, "");
    }

    #[tokio::test]
    async fn test_image_exhaustion_is_failed_result() {
        let pipeline = offline_pipeline(Arc::new(DisabledOcr));
        let output = pipeline
            .process_image(b"fake-image", Duration::from_secs(15))
            .await;
        assert_eq!(output.metadata.method, ExtractionMethod::Failed);
        assert!(output.contacts.is_empty());
    }

    #[test]
    fn test_strategy_deadline_floor() {
        assert_eq!(
            strategy_deadline(Duration::from_secs(60), 3),
            Duration::from_secs(20)
        );
        assert_eq!(
            strategy_deadline(Duration::from_secs(9), 3),
            Duration::from_secs(5)
        );
    }
}
