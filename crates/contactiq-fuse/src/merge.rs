//! Cross-strategy merge of draft lists.
//!
//! Used when several OCR strategies each produced a result for the same
//! image. Drafts describing the same contact are unified; the longer
//! non-empty value wins per field, ties keep the value seen first.

use contactiq_core::ContactDraft;
use tracing::debug;

/// Whether two drafts describe the same contact. The most specific field
/// both sides carry decides: email, else phone, else exact name. A pair
/// with no comparable field is treated as complementary fragments of the
/// same contact, which is what partial reads of one image produce.
fn same_contact(a: &ContactDraft, b: &ContactDraft) -> bool {
    if !a.email.is_empty() && !b.email.is_empty() {
        return a.email.eq_ignore_ascii_case(&b.email);
    }
    if !a.phone.is_empty() && !b.phone.is_empty() {
        return a.phone == b.phone;
    }
    if !a.name.is_empty() && !b.name.is_empty() {
        return a.name == b.name;
    }
    true
}

/// Merge several draft lists into one, unifying by email, else phone, else
/// exact name. Matching always runs against the merged draft's current
/// fields, so a draft that gains an email mid-merge unifies with later
/// drafts carrying that email.
pub fn merge_drafts(lists: Vec<Vec<ContactDraft>>) -> Vec<ContactDraft> {
    let mut merged: Vec<ContactDraft> = Vec::new();

    for draft in lists.into_iter().flatten() {
        match merged.iter_mut().find(|existing| same_contact(existing, &draft)) {
            Some(target) => {
                debug!("Unifying draft for {:?}", draft.email);
                merge_into(target, draft);
            }
            None => merged.push(draft),
        }
    }

    merged
}

fn merge_into(target: &mut ContactDraft, other: ContactDraft) {
    keep_longer(&mut target.name, other.name);
    keep_longer(&mut target.designation, other.designation);
    keep_longer(&mut target.company, other.company);
    keep_longer(&mut target.email, other.email);
    keep_longer(&mut target.phone, other.phone);
    keep_longer(&mut target.website, other.website);
    keep_longer(&mut target.address, other.address);
    keep_longer(&mut target.notes, other.notes);
    for category in other.categories {
        if !target.categories.contains(&category) {
            target.categories.push(category);
        }
    }
}

fn keep_longer(target: &mut String, other: String) {
    if other.len() > target.len() {
        *target = other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contactiq_core::Category;

    fn draft(name: &str, email: &str, phone: &str) -> ContactDraft {
        ContactDraft {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            ..ContactDraft::default()
        }
    }

    #[test]
    fn test_merge_by_email() {
        let a = draft("J. Roe", "jane@acme.com", "");
        let b = draft("Jane Roe", "jane@acme.com", "5550102345");
        let merged = merge_drafts(vec![vec![a], vec![b]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Jane Roe");
        assert_eq!(merged[0].phone, "5550102345");
    }

    #[test]
    fn test_merge_by_phone_when_no_email() {
        let a = draft("Jane", "", "5550102345");
        let b = draft("Jane Roe", "", "5550102345");
        let merged = merge_drafts(vec![vec![a, b]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Jane Roe");
    }

    #[test]
    fn test_distinct_contacts_not_merged() {
        let a = draft("Jane Roe", "jane@acme.com", "");
        let b = draft("John Smith", "john@acme.com", "");
        let merged = merge_drafts(vec![vec![a], vec![b]]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_distinct_names_not_merged_without_email_or_phone() {
        let a = draft("Jane Roe", "jane@acme.com", "");
        let b = draft("John Smith", "", "5550102345");
        let merged = merge_drafts(vec![vec![a], vec![b]]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_complementary_fragments_unified() {
        // One read got the email, another only the name; same card.
        let a = draft("", "jane@acme.com", "");
        let b = draft("Jane Roe", "", "");
        let merged = merge_drafts(vec![vec![a], vec![b]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Jane Roe");
        assert_eq!(merged[0].email, "jane@acme.com");
    }

    #[test]
    fn test_match_sees_fields_gained_mid_merge() {
        // The phone-only draft gains an email in the second pass; the third
        // draft carries only that email and must land on the same contact.
        let a = draft("", "", "5550102345");
        let b = draft("", "jane@acme.com", "5550102345");
        let c = draft("Jane Roe", "JANE@ACME.COM", "");
        let merged = merge_drafts(vec![vec![a], vec![b], vec![c]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Jane Roe");
        assert_eq!(merged[0].phone, "5550102345");
    }

    #[test]
    fn test_email_match_case_insensitive() {
        let a = draft("Jane", "Jane@Acme.com", "");
        let b = draft("Jane Roe", "jane@acme.com", "");
        let merged = merge_drafts(vec![vec![a], vec![b]]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_tie_keeps_first() {
        let a = draft("Jane Roe", "jane@acme.com", "");
        let b = draft("Mary Sue", "jane@acme.com", "");
        let merged = merge_drafts(vec![vec![a], vec![b]]);
        assert_eq!(merged[0].name, "Jane Roe");
    }

    #[test]
    fn test_categories_unioned_in_order() {
        let mut a = draft("Jane Roe", "jane@acme.com", "");
        a.categories = vec![Category::Embassy, Category::Government];
        let mut b = draft("Jane Roe", "jane@acme.com", "");
        b.categories = vec![Category::Government, Category::Logistics];
        let merged = merge_drafts(vec![vec![a], vec![b]]);
        assert_eq!(
            merged[0].categories,
            vec![Category::Embassy, Category::Government, Category::Logistics]
        );
    }

    #[test]
    fn test_merge_commutative_for_same_key() {
        let a = draft("J. Roe", "jane@acme.com", "5550102345");
        let b = draft("Jane Roe", "jane@acme.com", "");
        let ab = merge_drafts(vec![vec![a.clone()], vec![b.clone()]]);
        let ba = merge_drafts(vec![vec![b], vec![a]]);
        assert_eq!(ab[0].name, ba[0].name);
        assert_eq!(ab[0].phone, ba[0].phone);
        assert_eq!(ab[0].email, ba[0].email);
    }
}
