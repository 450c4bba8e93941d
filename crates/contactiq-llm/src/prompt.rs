//! Prompt construction for structured contact extraction.

use std::fmt::Write as _;

use contactiq_core::{Category, EntitySet};

/// Token budget for the full extraction prompt.
pub const FULL_MAX_TOKENS: usize = 1500;
/// Token budget for the shorter retry prompt.
pub const MINIMAL_MAX_TOKENS: usize = 800;

const CONTEXT_ENTITY_LIMIT: usize = 5;

/// Full prompt: recognized entities as grounding context plus strict
/// output rules and one example row.
pub fn build_prompt(text: &str, entities: &EntitySet, file_type: &str) -> String {
    let mut context = String::new();
    let _ = writeln!(context, "File Type: {}", file_type);
    let _ = writeln!(context, "Entity Analysis Context:");
    let _ = writeln!(
        context,
        "- Persons detected: {}",
        join_limited(&entities.persons, CONTEXT_ENTITY_LIMIT)
    );
    let _ = writeln!(
        context,
        "- Organizations: {}",
        join_limited(&entities.organizations, CONTEXT_ENTITY_LIMIT)
    );
    let _ = writeln!(
        context,
        "- Emails found: {}",
        join_limited(&entities.emails, usize::MAX)
    );
    let _ = writeln!(
        context,
        "- Phones found: {}",
        join_limited(&entities.phones, usize::MAX)
    );

    format!(
        "Extract contact information and return ONLY valid JSON array.\n\n\
         {context}\n\
         STRICT RULES:\n\
         1. Return ONLY JSON array - no other text, explanations, or formatting\n\
         2. Each contact needs: name, designation, company, email, phone, website, address, categories\n\
         3. Use \"\" for empty fields\n\
         4. Categories from: {categories}\n\
         5. Categories must be array: [\"category1\", \"category2\"]\n\n\
         EXAMPLE OUTPUT:\n\
         [{{\"name\":\"John Doe\",\"designation\":\"Manager\",\"company\":\"ABC Corp\",\
         \"email\":\"john@abc.com\",\"phone\":\"+1234567890\",\"website\":\"\",\
         \"address\":\"123 Main St\",\"categories\":[\"Others\"]}}]\n\n\
         TEXT:\n\
         {text}\n\n\
         JSON:",
        context = context,
        categories = category_list(),
        text = text,
    )
}

/// Short retry prompt used after a failed full-prompt attempt.
pub fn build_minimal_prompt(text: &str) -> String {
    format!(
        "Extract contacts from the text below. Respond with a JSON array only.\n\
         Fields: name, designation, company, email, phone, website, address, categories.\n\
         Example: [{{\"name\":\"Jane Roe\",\"email\":\"jane@example.com\"}}]\n\n\
         {text}",
        text = text,
    )
}

fn category_list() -> String {
    Category::ALL
        .iter()
        .map(|c| format!("\"{}\"", c.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_limited(mentions: &[contactiq_core::EntityMention], limit: usize) -> String {
    let texts: Vec<&str> = mentions
        .iter()
        .take(limit)
        .map(|m| m.text.as_str())
        .collect();
    if texts.is_empty() {
        "none".to_string()
    } else {
        texts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactiq_core::EntityMention;

    fn mention(text: &str) -> EntityMention {
        EntityMention {
            text: text.to_string(),
            start: 0,
            end: text.len(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_prompt_embeds_context() {
        let mut entities = EntitySet::default();
        entities.emails.push(mention("a@b.com"));
        entities.persons.push(mention("Jane Roe"));
        let prompt = build_prompt("some card text", &entities, "text");
        assert!(prompt.contains("a@b.com"));
        assert!(prompt.contains("Jane Roe"));
        assert!(prompt.contains("some card text"));
        assert!(prompt.contains("STRICT RULES"));
    }

    #[test]
    fn test_prompt_limits_persons_to_five() {
        let mut entities = EntitySet::default();
        for i in 0..8 {
            entities.persons.push(mention(&format!("Person Number{}", i)));
        }
        let prompt = build_prompt("text", &entities, "text");
        assert!(prompt.contains("Person Number4"));
        assert!(!prompt.contains("Person Number5"));
    }

    #[test]
    fn test_prompt_lists_all_categories() {
        let entities = EntitySet::default();
        let prompt = build_prompt("text", &entities, "text");
        for category in contactiq_core::Category::ALL {
            assert!(prompt.contains(category.as_str()), "{}", category.as_str());
        }
    }

    #[test]
    fn test_minimal_prompt_is_shorter() {
        let entities = EntitySet::default();
        let full = build_prompt("same text", &entities, "text");
        let minimal = build_minimal_prompt("same text");
        assert!(minimal.len() < full.len());
        assert!(minimal.contains("same text"));
    }
}
