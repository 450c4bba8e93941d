//! Core data model — entity sets, contact drafts, the category taxonomy.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Business category taxonomy — fixed, closed set.
///
/// Every emitted contact carries at least one of these; an unrecognized or
/// missing label is replaced by an inferred value, never left invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Government,
    Embassy,
    Consulate,
    HighCommissioner,
    DeputyHighCommissioner,
    Association,
    Exporter,
    Importer,
    Logistics,
    EventManagement,
    Consultancy,
    Manufacturer,
    Distributor,
    Producer,
    Healthcare,
    Education,
    Finance,
    Personal,
    Business,
    #[default]
    Others,
}

impl Category {
    /// All taxonomy members, in display order.
    pub const ALL: &'static [Category] = &[
        Category::Government,
        Category::Embassy,
        Category::Consulate,
        Category::HighCommissioner,
        Category::DeputyHighCommissioner,
        Category::Association,
        Category::Exporter,
        Category::Importer,
        Category::Logistics,
        Category::EventManagement,
        Category::Consultancy,
        Category::Manufacturer,
        Category::Distributor,
        Category::Producer,
        Category::Healthcare,
        Category::Education,
        Category::Finance,
        Category::Personal,
        Category::Business,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Government => "Government",
            Category::Embassy => "Embassy",
            Category::Consulate => "Consulate",
            Category::HighCommissioner => "High Commissioner",
            Category::DeputyHighCommissioner => "Deputy High Commissioner",
            Category::Association => "Association",
            Category::Exporter => "Exporter",
            Category::Importer => "Importer",
            Category::Logistics => "Logistics",
            Category::EventManagement => "Event Management",
            Category::Consultancy => "Consultancy",
            Category::Manufacturer => "Manufacturer",
            Category::Distributor => "Distributor",
            Category::Producer => "Producer",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Finance => "Finance",
            Category::Personal => "Personal",
            Category::Business => "Business",
            Category::Others => "Others",
        }
    }

    /// Parse a category label. Case-insensitive and tolerant of the legacy
    /// plural spellings that appear in exported data ("Associations",
    /// "Distributors", "Producers", "Event management").
    pub fn parse(label: &str) -> Option<Category> {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "government" => Some(Category::Government),
            "embassy" | "embassies" => Some(Category::Embassy),
            "consulate" => Some(Category::Consulate),
            "high commissioner" | "high commission" => Some(Category::HighCommissioner),
            "deputy high commissioner" | "deputy high commission" => {
                Some(Category::DeputyHighCommissioner)
            }
            "association" | "associations" => Some(Category::Association),
            "exporter" | "exporters" => Some(Category::Exporter),
            "importer" | "importers" => Some(Category::Importer),
            "logistics" => Some(Category::Logistics),
            "event management" => Some(Category::EventManagement),
            "consultancy" => Some(Category::Consultancy),
            "manufacturer" | "manufacturers" => Some(Category::Manufacturer),
            "distributor" | "distributors" => Some(Category::Distributor),
            "producer" | "producers" => Some(Category::Producer),
            "healthcare" => Some(Category::Healthcare),
            "education" => Some(Category::Education),
            "finance" => Some(Category::Finance),
            "personal" => Some(Category::Personal),
            "business" => Some(Category::Business),
            "others" | "other" | "uncategorized" => Some(Category::Others),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Category::parse(&s).ok_or_else(|| de::Error::custom(format!("unknown category: {}", s)))
    }
}

/// Kind of a recognized entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Person,
    Organization,
    Email,
    Phone,
    Location,
}

/// One recognized span of text with a heuristic confidence weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    /// Byte offset of the match start in the source text.
    pub start: usize,
    /// Byte offset one past the match end.
    pub end: usize,
    /// Heuristic weighting hint, not a calibrated probability.
    pub confidence: f64,
}

/// Immutable result of one recognition pass over a text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySet {
    pub persons: Vec<EntityMention>,
    pub organizations: Vec<EntityMention>,
    pub emails: Vec<EntityMention>,
    pub phones: Vec<EntityMention>,
    pub locations: Vec<EntityMention>,
}

impl EntitySet {
    /// Mentions of one kind, in recognition order.
    pub fn of_kind(&self, kind: EntityKind) -> &[EntityMention] {
        match kind {
            EntityKind::Person => &self.persons,
            EntityKind::Organization => &self.organizations,
            EntityKind::Email => &self.emails,
            EntityKind::Phone => &self.phones,
            EntityKind::Location => &self.locations,
        }
    }

    pub fn total(&self) -> usize {
        self.persons.len()
            + self.organizations.len()
            + self.emails.len()
            + self.phones.len()
            + self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Texts of one kind (convenience for prompt building and backfill).
    pub fn texts(&self, kind: EntityKind) -> Vec<&str> {
        self.of_kind(kind).iter().map(|m| m.text.as_str()).collect()
    }
}

/// A candidate contact record under construction.
///
/// Fixed shape: all fields present, defaulting to empty string / empty list,
/// never null. Serialized form is exactly the nine-field output contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub notes: String,
}

impl ContactDraft {
    /// A draft may only be emitted if it carries at least one identifying
    /// field. Enforced at the pipeline boundary.
    pub fn is_emittable(&self) -> bool {
        !self.name.is_empty() || !self.email.is_empty() || !self.phone.is_empty()
    }
}

/// Provenance tag recording which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Direct parse of well-formed model output.
    Model,
    /// Model output recovered via pattern search.
    ModelRepaired,
    /// Single draft salvaged from unparseable model output.
    ModelFallbackDraft,
    /// Drafts constructed purely from recognizer entities.
    EntityFallback,
    /// Drafts parsed directly from an already-structured format (CSV, vCard).
    Structured,
    /// Cross-strategy merged result (image inputs).
    Merged,
    /// Every strategy failed or produced nothing.
    Failed,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExtractionMethod::Model => "model",
            ExtractionMethod::ModelRepaired => "model_repaired",
            ExtractionMethod::ModelFallbackDraft => "model_fallback_draft",
            ExtractionMethod::EntityFallback => "entity_fallback",
            ExtractionMethod::Structured => "structured",
            ExtractionMethod::Merged => "merged",
            ExtractionMethod::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Output of the fusion stage for one text input.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub drafts: Vec<ContactDraft>,
    /// Aggregate confidence in [0, 1].
    pub confidence: f64,
    pub method: ExtractionMethod,
}

impl ExtractionResult {
    pub fn empty(method: ExtractionMethod) -> Self {
        Self {
            drafts: Vec::new(),
            confidence: 0.0,
            method,
        }
    }
}

/// Sibling metadata object reported next to the contact array.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    pub confidence: f64,
    pub method: ExtractionMethod,
    #[serde(rename = "entitiesFoundCount")]
    pub entities_found_count: usize,
    #[serde(rename = "textLength")]
    pub text_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_roundtrip() {
        for cat in Category::ALL {
            assert_eq!(Category::parse(cat.as_str()), Some(*cat));
        }
    }

    #[test]
    fn test_category_parse_legacy_spellings() {
        assert_eq!(Category::parse("Associations"), Some(Category::Association));
        assert_eq!(Category::parse("Distributors"), Some(Category::Distributor));
        assert_eq!(Category::parse("Producers"), Some(Category::Producer));
        assert_eq!(
            Category::parse("Event management"),
            Some(Category::EventManagement)
        );
        assert_eq!(Category::parse("OTHERS"), Some(Category::Others));
        assert_eq!(Category::parse("nonsense"), None);
    }

    #[test]
    fn test_draft_emittable() {
        let mut draft = ContactDraft::default();
        assert!(!draft.is_emittable());
        draft.phone = "5551234".into();
        assert!(draft.is_emittable());
    }

    #[test]
    fn test_draft_serialized_shape() {
        let draft = ContactDraft {
            name: "Jane".into(),
            categories: vec![Category::Others],
            ..Default::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        let obj = value.as_object().unwrap();
        for field in [
            "name",
            "designation",
            "company",
            "email",
            "phone",
            "website",
            "address",
            "categories",
            "notes",
        ] {
            assert!(obj.contains_key(field), "missing field {}", field);
        }
        assert_eq!(obj.len(), 9);
        assert_eq!(value["categories"][0], "Others");
    }

    #[test]
    fn test_entity_set_counts() {
        let mut set = EntitySet::default();
        assert!(set.is_empty());
        set.emails.push(EntityMention {
            text: "a@b.co".into(),
            start: 0,
            end: 6,
            confidence: 0.9,
        });
        assert_eq!(set.total(), 1);
        assert_eq!(set.texts(EntityKind::Email), vec!["a@b.co"]);
    }
}
