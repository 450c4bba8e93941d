//! Entity recognizer — regex matchers for emails/phones plus line-level
//! heuristics for names, organizations, and locations.
//!
//! `recognize` is a pure function of the text. It never fails: with no
//! statistical model in-process, the regex/heuristic tier is the
//! implementation, and its output degrades gracefully on noisy input.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use contactiq_core::{EntityMention, EntitySet};

pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

/// Candidate phone runs: digits with common separators. Validated by digit
/// count afterwards, so the pattern can stay permissive.
static PHONE_CANDIDATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?[0-9][0-9\-\.\(\)\s]{6,18}[0-9]").unwrap());

static ORG_KEYWORDS: &[&str] = &[
    "company",
    "corp",
    "ltd",
    "limited",
    "inc",
    "llc",
    "llp",
    "plc",
    "organization",
    "institute",
    "embassy",
    "consulate",
    "ministry",
    "department",
];

static ADDRESS_KEYWORDS: &[&str] = &[
    "street", "st.", "road", "rd.", "avenue", "ave", "lane", "boulevard", "suite", "floor", "p.o.",
];

/// Line prefixes that are labels, not content.
static LABEL_PREFIXES: &[&str] = &["tel", "fax", "email", "phone", "mobile", "www", "http"];

/// Confidence constants per source. Weighting hints, not probabilities.
const CONF_EMAIL: f64 = 0.9;
const CONF_PERSON: f64 = 0.8;
const CONF_ORG: f64 = 0.8;
const CONF_PHONE: f64 = 0.7;
const CONF_LOCATION: f64 = 0.7;

/// Run one recognition pass over a text.
pub fn recognize(text: &str) -> EntitySet {
    let mut set = EntitySet::default();

    for m in EMAIL_RE.find_iter(text) {
        set.emails.push(EntityMention {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            confidence: CONF_EMAIL,
        });
    }

    extract_phones(text, &mut set);
    extract_from_lines(text, &mut set);

    set
}

/// Phone candidates normalized to digits; 8–15 digits accepted, deduplicated
/// preserving first-seen order.
fn extract_phones(text: &str, set: &mut EntitySet) {
    let mut seen: HashSet<String> = HashSet::new();
    for m in PHONE_CANDIDATE_RE.find_iter(text) {
        // Skip matches inside an email address
        if set
            .emails
            .iter()
            .any(|e| m.start() >= e.start && m.end() <= e.end)
        {
            continue;
        }
        let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
        if (8..=15).contains(&digits.len()) && seen.insert(digits) {
            set.phones.push(EntityMention {
                text: m.as_str().trim().to_string(),
                start: m.start(),
                end: m.end(),
                confidence: CONF_PHONE,
            });
        }
    }
}

/// Line-level heuristics for persons, organizations, and locations.
fn extract_from_lines(text: &str, set: &mut EntitySet) {
    let mut offset = 0usize;
    for raw_line in text.split('\n') {
        let line_start = offset;
        offset += raw_line.len() + 1;

        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        if LABEL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            continue;
        }
        let start = line_start + (raw_line.len() - raw_line.trim_start().len());
        let end = start + line.len();

        if ORG_KEYWORDS.iter().any(|k| lower.contains(k)) {
            set.organizations.push(EntityMention {
                text: line.to_string(),
                start,
                end,
                confidence: CONF_ORG,
            });
            continue;
        }

        if let Some(name) = person_name_in_line(line) {
            set.persons.push(EntityMention {
                text: name,
                start,
                end,
                confidence: CONF_PERSON,
            });
            continue;
        }

        if ADDRESS_KEYWORDS.iter().any(|k| lower.contains(k)) {
            set.locations.push(EntityMention {
                text: line.to_string(),
                start,
                end,
                confidence: CONF_LOCATION,
            });
        }
    }
}

/// First run of 2-3 title-cased alphabetic tokens in a line. Tokens that
/// carry digits or punctuation (emails, phone fragments) end a run rather
/// than disqualifying the whole line.
fn person_name_in_line(line: &str) -> Option<String> {
    let mut run: Vec<&str> = Vec::new();
    // A trailing sentinel flushes a run ending at the line boundary.
    for token in line.split_whitespace().chain(std::iter::once("")) {
        if is_name_token(token) {
            run.push(token);
            continue;
        }
        if (2..=3).contains(&run.len()) {
            return Some(run.join(" "));
        }
        run.clear();
    }
    None
}

fn is_name_token(token: &str) -> bool {
    match token.chars().next() {
        Some(first) => {
            first.is_uppercase() && token.chars().all(|c| c.is_alphabetic() || c == '.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_business_card() {
        let text = "John Doe\nAcme Corp\njohn@acme.com\n+1-555-000-1111";
        let set = recognize(text);
        assert_eq!(set.persons[0].text, "John Doe");
        assert_eq!(set.organizations[0].text, "Acme Corp");
        assert_eq!(set.emails[0].text, "john@acme.com");
        assert_eq!(set.phones.len(), 1);
        let digits: String = set.phones[0]
            .text
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        assert_eq!(digits, "15550001111");
    }

    #[test]
    fn test_email_case_insensitive() {
        let set = recognize("Contact: John.DOE@Acme.COM for details");
        assert_eq!(set.emails.len(), 1);
        assert_eq!(set.emails[0].text, "John.DOE@Acme.COM");
    }

    #[test]
    fn test_phone_length_bounds() {
        // 7 digits: too short. 16 digits: too long.
        let set = recognize("call 555-0111 or 1234 5678 9012 3456");
        assert!(set.phones.is_empty());

        let set = recognize("call 0422 123456");
        assert_eq!(set.phones.len(), 1);
    }

    #[test]
    fn test_phone_dedup() {
        let set = recognize("Tel: +91 98765 43210\nMobile: 98765-43210 again 9876543210");
        // Different renderings of different digit strings stay; identical
        // digit strings collapse to the first occurrence.
        let digit_sets: Vec<String> = set
            .phones
            .iter()
            .map(|p| p.text.chars().filter(|c| c.is_ascii_digit()).collect())
            .collect();
        let unique: HashSet<&String> = digit_sets.iter().collect();
        assert_eq!(unique.len(), digit_sets.len());
    }

    #[test]
    fn test_label_lines_skipped() {
        let set = recognize("Tel Aviv Branch\nJane Smith");
        // "Tel Aviv Branch" starts with a label prefix and is skipped.
        assert_eq!(set.persons.len(), 1);
        assert_eq!(set.persons[0].text, "Jane Smith");
    }

    #[test]
    fn test_name_extracted_beside_phone_token() {
        let set = recognize("John Doe 555-1234");
        assert_eq!(set.persons.len(), 1);
        assert_eq!(set.persons[0].text, "John Doe");
    }

    #[test]
    fn test_name_extracted_beside_email_token() {
        let set = recognize("Jane Smith jane@acme.com");
        assert_eq!(set.persons[0].text, "Jane Smith");
        assert_eq!(set.emails[0].text, "jane@acme.com");
    }

    #[test]
    fn test_garbled_token_is_not_a_name() {
        // A digit inside the leading token leaves no 2-token run.
        let set = recognize("J0hn Doe email@x.com");
        assert!(set.persons.is_empty());
        assert_eq!(set.emails.len(), 1);
    }

    #[test]
    fn test_empty_text() {
        let set = recognize("");
        assert!(set.is_empty());
    }

    #[test]
    fn test_location_line() {
        let set = recognize("42 Baker Street, London");
        assert_eq!(set.locations.len(), 1);
    }
}
