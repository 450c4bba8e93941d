//! Fusion of model drafts with recognizer entities.
//!
//! Model output is repaired field by field against the recognized entity
//! set, invalid drafts are dropped, and when the model produced nothing the
//! entity set alone is turned into fallback drafts. The aggregate confidence
//! reflects field completeness corroborated by the entities.

use contactiq_core::{
    Category, ContactDraft, EntitySet, ExtractionMethod, ExtractionResult,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

pub mod merge;

pub use merge::merge_drafts;

static FULL_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
});

/// Fixed confidence for drafts built from entities alone.
const ENTITY_FALLBACK_CONFIDENCE: f64 = 0.6;

/// Repair model drafts against the entity set and score the result.
///
/// An empty draft list falls back to entity-derived drafts with method
/// [`ExtractionMethod::EntityFallback`].
pub fn fuse(
    drafts: Vec<ContactDraft>,
    method: ExtractionMethod,
    entities: &EntitySet,
    original_text: &str,
) -> ExtractionResult {
    if drafts.is_empty() {
        return entity_fallback(entities, original_text);
    }

    let mut repaired = Vec::with_capacity(drafts.len());
    for draft in drafts {
        if let Some(draft) = repair_draft(draft, entities, original_text) {
            repaired.push(draft);
        }
    }

    if repaired.is_empty() {
        debug!("All model drafts dropped during repair, using entity fallback");
        return entity_fallback(entities, original_text);
    }

    let confidence = score_confidence(&repaired, entities);
    info!("Fused {} drafts with confidence {:.2}", repaired.len(), confidence);
    ExtractionResult {
        drafts: repaired,
        confidence,
        method,
    }
}

/// Per-draft repair. Returns `None` when the draft ends up with no
/// identifying field.
fn repair_draft(
    mut draft: ContactDraft,
    entities: &EntitySet,
    original_text: &str,
) -> Option<ContactDraft> {
    // A valid email is never replaced; an invalid one is substituted from
    // the entity set or cleared.
    if !draft.email.is_empty() && !FULL_EMAIL_RE.is_match(&draft.email) {
        draft.email = entities
            .emails
            .first()
            .map(|m| m.text.clone())
            .unwrap_or_default();
    }

    draft.phone = normalize_phone(&draft.phone);

    // Unknown category labels were already dropped at the parse boundary;
    // an empty list means inference is needed.
    if draft.categories.is_empty() {
        draft.categories = vec![contactiq_categorize::infer_for_draft(&draft, original_text)];
    }

    if draft.name.is_empty() {
        if let Some(m) = entities.persons.first() {
            draft.name = m.text.clone();
        }
    }
    if draft.company.is_empty() {
        if let Some(m) = entities.organizations.first() {
            draft.company = m.text.clone();
        }
    }

    draft.is_emittable().then_some(draft)
}

/// Canonical phone form: digits only, without the country code. An
/// 11-digit number starting with 1 is NANP with its country code attached,
/// a 12-digit number starting with 91 carries the Indian code.
fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else if digits.len() == 12 && digits.starts_with("91") {
        digits[2..].to_string()
    } else {
        digits
    }
}

/// One draft per recognized email with positional pairing; without emails,
/// a single draft from the strongest remaining signals.
fn entity_fallback(entities: &EntitySet, original_text: &str) -> ExtractionResult {
    let persons = &entities.persons;
    let orgs = &entities.organizations;
    let phones = &entities.phones;

    let first_company = orgs.first().map(|m| m.text.clone()).unwrap_or_default();
    let category =
        contactiq_categorize::infer(&first_company, "", original_text, "");

    let mut drafts = Vec::new();
    for (i, email) in entities.emails.iter().enumerate() {
        drafts.push(ContactDraft {
            name: persons.get(i).map(|m| m.text.clone()).unwrap_or_default(),
            company: orgs
                .get(i)
                .or_else(|| orgs.first())
                .map(|m| m.text.clone())
                .unwrap_or_default(),
            email: email.text.clone(),
            phone: phones
                .get(i)
                .or_else(|| phones.first())
                .map(|m| normalize_phone(&m.text))
                .unwrap_or_default(),
            categories: vec![category],
            ..ContactDraft::default()
        });
    }

    if drafts.is_empty() {
        let draft = ContactDraft {
            name: persons.first().map(|m| m.text.clone()).unwrap_or_default(),
            company: first_company,
            phone: phones
                .first()
                .map(|m| normalize_phone(&m.text))
                .unwrap_or_default(),
            categories: vec![category],
            ..ContactDraft::default()
        };
        if draft.is_emittable() {
            drafts.push(draft);
        }
    }

    if drafts.is_empty() {
        return ExtractionResult::empty(ExtractionMethod::Failed);
    }

    ExtractionResult {
        drafts,
        confidence: ENTITY_FALLBACK_CONFIDENCE,
        method: ExtractionMethod::EntityFallback,
    }
}

/// Average per-draft completeness plus an entity corroboration boost,
/// clamped to [0, 1].
fn score_confidence(drafts: &[ContactDraft], entities: &EntitySet) -> f64 {
    if drafts.is_empty() {
        return 0.0;
    }

    let total: f64 = drafts
        .iter()
        .map(|d| {
            let mut score = 0.0;
            if !d.name.is_empty() {
                score += 0.2;
            }
            if d.email.contains('@') {
                score += 0.3;
            }
            if !d.phone.is_empty() {
                score += 0.2;
            }
            if !d.company.is_empty() {
                score += 0.2;
            }
            if !d.categories.is_empty() && d.categories != [Category::Others] {
                score += 0.1;
            }
            score
        })
        .sum();

    let mut boost = 0.0;
    if !entities.emails.is_empty() {
        boost += 0.1;
    }
    if !entities.persons.is_empty() {
        boost += 0.1;
    }
    if !entities.organizations.is_empty() {
        boost += 0.1;
    }

    (total / drafts.len() as f64 + boost).min(1.0)
}
