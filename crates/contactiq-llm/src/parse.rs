//! Repair cascade for model responses.
//!
//! Model output is untrusted text. The cascade walks an ordered list of
//! recovery steps and the first one that yields drafts wins. Each step is a
//! pure function of the response text and the recognized entity set.

use contactiq_core::{Category, ContactDraft, EntitySet, ExtractionMethod};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

static BARE_ARRAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[\s\S]*?\]").unwrap());
static JSON_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\s*(\[[\s\S]*?\])\s*```").unwrap());
static ANY_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```\s*(\[[\s\S]*?\])\s*```").unwrap());

static SALVAGE_EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});
static SALVAGE_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?[1-9][\d\s\-\(\)]{7,14}").unwrap());

/// Draft as the model actually writes it. Unknown fields are ignored,
/// `categories` arrives as a string or an array, unrecognized category
/// labels are dropped rather than failing the whole draft.
#[derive(Debug, Default, Deserialize)]
struct RawDraft {
    #[serde(default)]
    name: String,
    #[serde(default)]
    designation: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    categories: serde_json::Value,
    #[serde(default)]
    notes: String,
}

impl RawDraft {
    fn into_draft(self) -> ContactDraft {
        let categories = parse_categories(&self.categories);
        ContactDraft {
            name: self.name.trim().to_string(),
            designation: self.designation.trim().to_string(),
            company: self.company.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            website: self.website.trim().to_string(),
            address: self.address.trim().to_string(),
            categories,
            notes: self.notes.trim().to_string(),
        }
    }
}

fn parse_categories(value: &serde_json::Value) -> Vec<Category> {
    let labels: Vec<&str> = match value {
        serde_json::Value::String(s) => vec![s.as_str()],
        serde_json::Value::Array(items) => {
            items.iter().filter_map(|v| v.as_str()).collect()
        }
        _ => Vec::new(),
    };
    labels.iter().filter_map(|l| Category::parse(l)).collect()
}

/// Run the repair cascade over a raw model response. `None` means nothing
/// recoverable was found.
pub fn parse_response(
    raw: &str,
    entities: &EntitySet,
) -> Option<(Vec<ContactDraft>, ExtractionMethod)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(drafts) = parse_array(trimmed) {
        return Some((drafts, ExtractionMethod::Model));
    }

    if let Some(drafts) = repair_with_patterns(trimmed) {
        return Some((drafts, ExtractionMethod::ModelRepaired));
    }

    if let Some(draft) = salvage_draft(trimmed, entities) {
        return Some((vec![draft], ExtractionMethod::ModelFallbackDraft));
    }

    warn!("Model response unrecoverable, {} chars", trimmed.len());
    None
}

fn parse_array(text: &str) -> Option<Vec<ContactDraft>> {
    let raw: Vec<RawDraft> = serde_json::from_str(text).ok()?;
    Some(raw.into_iter().map(RawDraft::into_draft).collect())
}

fn repair_with_patterns(text: &str) -> Option<Vec<ContactDraft>> {
    let candidates = [
        BARE_ARRAY_RE.find(text).map(|m| m.as_str()),
        JSON_FENCE_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str()),
        ANY_FENCE_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str()),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(drafts) = parse_array(candidate) {
            debug!("Recovered JSON array from malformed response");
            return Some(drafts);
        }
    }
    None
}

/// Last resort: build a single draft from the entity set plus whatever the
/// response text still carries. Emitted only with at least one identifying
/// field.
fn salvage_draft(text: &str, entities: &EntitySet) -> Option<ContactDraft> {
    let mut draft = ContactDraft::default();

    if let Some(m) = entities.emails.first() {
        draft.email = m.text.clone();
    }
    if let Some(m) = entities.phones.first() {
        draft.phone = m.text.clone();
    }
    if let Some(m) = entities.persons.first() {
        draft.name = m.text.clone();
    }
    if let Some(m) = entities.organizations.first() {
        draft.company = m.text.clone();
    }

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if draft.email.is_empty() {
            if let Some(m) = SALVAGE_EMAIL_RE.find(line) {
                draft.email = m.as_str().to_string();
            }
        }
        if draft.phone.is_empty() && line.chars().any(|c| c.is_ascii_digit()) {
            if let Some(m) = SALVAGE_PHONE_RE.find(line) {
                draft.phone = m.as_str().trim().to_string();
            }
        }
        if draft.name.is_empty() && looks_like_name(line) {
            draft.name = line.to_string();
        }
    }

    if draft.is_emittable() {
        Some(draft)
    } else {
        None
    }
}

fn looks_like_name(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() || words.len() > 3 {
        return false;
    }
    line.chars().all(|c| c.is_alphabetic() || c == ' ')
        && line.chars().next().is_some_and(|c| c.is_uppercase())
}
