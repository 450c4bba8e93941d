//! Best-effort text extraction for supported container formats.
//!
//! Every extractor returns an empty string (or empty list) on failure;
//! nothing here raises into the pipeline. CSV and vCard are already
//! structured, so they also expose direct draft parsers.

use contactiq_core::{Category, ContactDraft};
use tracing::warn;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Markdown,
    Csv,
    VCard,
    Pdf,
    Docx,
    Image,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" => Self::PlainText,
            "md" | "mdx" => Self::Markdown,
            "csv" => Self::Csv,
            "vcf" | "vcard" => Self::VCard,
            "pdf" => Self::Pdf,
            "docx" | "doc" => Self::Docx,
            "png" | "jpg" | "jpeg" | "tiff" | "bmp" | "webp" => Self::Image,
            _ => Self::Unknown,
        }
    }

    pub fn from_filename(name: &str) -> Self {
        std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Label used in prompts and metadata.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
            Self::VCard => "vcard",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Image => "image",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image)
    }

    /// Formats whose rows/properties map straight onto contact drafts.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Csv | Self::VCard)
    }
}

/// Extract plain text from raw bytes, best-effort.
///
/// PDF, DOCX, and image decoding live in external collaborators; asking for
/// them here yields an empty string with a warning.
pub fn extract_text(bytes: &[u8], file_type: FileType) -> String {
    match file_type {
        FileType::PlainText | FileType::Markdown | FileType::Unknown => {
            String::from_utf8_lossy(bytes).into_owned()
        }
        FileType::Csv => csv_to_text(&String::from_utf8_lossy(bytes)),
        FileType::VCard => {
            // vCards flatten into labeled lines so the downstream stages can
            // still run over them as free text.
            parse_vcard_contacts(bytes)
                .iter()
                .map(draft_as_lines)
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        FileType::Pdf | FileType::Docx | FileType::Image => {
            warn!(
                "In-process decoding for {} is not supported; route through the external extractor",
                file_type.label()
            );
            String::new()
        }
    }
}

fn draft_as_lines(draft: &ContactDraft) -> String {
    let mut lines = Vec::new();
    for (label, value) in [
        ("", draft.name.as_str()),
        ("", draft.designation.as_str()),
        ("", draft.company.as_str()),
        ("Email: ", draft.email.as_str()),
        ("Tel: ", draft.phone.as_str()),
        ("Web: ", draft.website.as_str()),
        ("", draft.address.as_str()),
    ] {
        if !value.is_empty() {
            lines.push(format!("{}{}", label, value));
        }
    }
    lines.join("\n")
}

// ---------------------------------------------------------------
// CSV
// ---------------------------------------------------------------

/// Column-name synonyms accepted for each draft field.
fn map_column(header: &str) -> Option<&'static str> {
    match header.trim().to_lowercase().as_str() {
        "name" | "full name" | "contact" => Some("name"),
        "designation" | "title" | "job title" | "position" => Some("designation"),
        "company" | "organization" | "organisation" | "employer" => Some("company"),
        "email" | "e-mail" | "email address" => Some("email"),
        "phone" | "telephone" | "mobile" | "tel" => Some("phone"),
        "website" | "url" | "web" => Some("website"),
        "address" | "location" => Some("address"),
        "notes" | "note" | "comments" => Some("notes"),
        _ => None,
    }
}

/// Parse CSV content into contact drafts. Rows with no mappable values are
/// dropped; malformed input yields an empty list.
pub fn parse_csv_contacts(bytes: &[u8]) -> Vec<ContactDraft> {
    let content = String::from_utf8_lossy(bytes);
    let mut lines = content.lines();
    let header = match lines.next() {
        Some(h) => split_csv_line(h),
        None => return Vec::new(),
    };
    let fields: Vec<Option<&'static str>> = header.iter().map(|h| map_column(h)).collect();
    if fields.iter().all(|f| f.is_none()) {
        return Vec::new();
    }

    let mut contacts = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let values = split_csv_line(line);
        let mut draft = ContactDraft {
            categories: vec![Category::Others],
            ..Default::default()
        };
        let mut any = false;
        for (i, value) in values.iter().enumerate() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match fields.get(i).copied().flatten() {
                Some("name") => draft.name = value.to_string(),
                Some("designation") => draft.designation = value.to_string(),
                Some("company") => draft.company = value.to_string(),
                Some("email") => draft.email = value.to_string(),
                Some("phone") => draft.phone = value.to_string(),
                Some("website") => draft.website = value.to_string(),
                Some("address") => draft.address = value.to_string(),
                Some("notes") => draft.notes = value.to_string(),
                _ => continue,
            }
            any = true;
        }
        if any {
            contacts.push(draft);
        }
    }
    contacts
}

/// Split one CSV line honoring double-quoted fields ("" escapes a quote).
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn csv_to_text(content: &str) -> String {
    content
        .lines()
        .map(|l| split_csv_line(l).join(" | "))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------
// vCard
// ---------------------------------------------------------------

/// Parse vCard (VCF) content into contact drafts.
///
/// Handles RFC 6350 line folding and the common properties
/// (FN/N/ORG/TITLE/EMAIL/TEL/URL/ADR). Unknown properties are ignored.
pub fn parse_vcard_contacts(bytes: &[u8]) -> Vec<ContactDraft> {
    let content = String::from_utf8_lossy(bytes);
    let unfolded = unfold_lines(&content);

    let mut contacts = Vec::new();
    let mut current: Option<ContactDraft> = None;

    for line in &unfolded {
        let upper = line.to_uppercase();
        if upper.starts_with("BEGIN:VCARD") {
            current = Some(ContactDraft {
                categories: vec![Category::Others],
                ..Default::default()
            });
            continue;
        }
        if upper.starts_with("END:VCARD") {
            if let Some(draft) = current.take() {
                if draft.is_emittable() {
                    contacts.push(draft);
                }
            }
            continue;
        }
        let Some(draft) = current.as_mut() else {
            continue;
        };
        let Some((prop, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        // Property name may carry parameters: "TEL;TYPE=work"
        let prop_name = prop.split(';').next().unwrap_or("").to_uppercase();
        match prop_name.as_str() {
            "FN" => draft.name = value.to_string(),
            "N" if draft.name.is_empty() => {
                // N is family;given;middle;prefix;suffix
                let parts: Vec<&str> = value.split(';').collect();
                let given = parts.get(1).copied().unwrap_or("");
                let family = parts.first().copied().unwrap_or("");
                draft.name = format!("{} {}", given, family).trim().to_string();
            }
            "ORG" => {
                draft.company = value.split(';').next().unwrap_or(value).trim().to_string()
            }
            "TITLE" => draft.designation = value.to_string(),
            "EMAIL" if draft.email.is_empty() => draft.email = value.to_string(),
            "TEL" if draft.phone.is_empty() => draft.phone = value.to_string(),
            "URL" => draft.website = value.to_string(),
            "ADR" => {
                let parts: Vec<&str> = value
                    .split(';')
                    .map(|p| p.trim())
                    .filter(|p| !p.is_empty())
                    .collect();
                draft.address = parts.join(", ");
            }
            "NOTE" => draft.notes = value.to_string(),
            _ => {}
        }
    }

    contacts
}

/// Unfold continuation lines (lines starting with space or tab).
fn unfold_lines(content: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in content.lines() {
        if (line.starts_with(' ') || line.starts_with('\t')) && !out.is_empty() {
            let idx = out.len() - 1;
            out[idx].push_str(line.trim_start());
        } else {
            out.push(line.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_filename("card.jpg"), FileType::Image);
        assert_eq!(FileType::from_filename("book.VCF"), FileType::VCard);
        assert_eq!(FileType::from_filename("list.csv"), FileType::Csv);
        assert_eq!(FileType::from_filename("noext"), FileType::Unknown);
        assert!(FileType::Csv.is_structured());
        assert!(!FileType::PlainText.is_structured());
    }

    #[test]
    fn test_csv_parsing() {
        let csv = "Name,Title,Company,Email,Phone\n\
                   Jane Roe,Director,\"Widgets, Inc\",jane@widgets.io,555-0100\n\
                   ,,,,\n";
        let contacts = parse_csv_contacts(csv.as_bytes());
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "Jane Roe");
        assert_eq!(contacts[0].designation, "Director");
        assert_eq!(contacts[0].company, "Widgets, Inc");
        assert_eq!(contacts[0].email, "jane@widgets.io");
    }

    #[test]
    fn test_csv_unmappable_header() {
        let csv = "foo,bar\n1,2\n";
        assert!(parse_csv_contacts(csv.as_bytes()).is_empty());
    }

    #[test]
    fn test_vcard_parsing() {
        let vcf = "BEGIN:VCARD\r\n\
                   VERSION:3.0\r\n\
                   FN:John Doe\r\n\
                   ORG:Acme Corp;Engineering\r\n\
                   TITLE:Manager\r\n\
                   EMAIL;TYPE=work:john@acme.com\r\n\
                   TEL;TYPE=cell:+1 555 000 1111\r\n\
                   ADR:;;123 Main St;Springfield;;12345;USA\r\n\
                   END:VCARD\r\n";
        let contacts = parse_vcard_contacts(vcf.as_bytes());
        assert_eq!(contacts.len(), 1);
        let c = &contacts[0];
        assert_eq!(c.name, "John Doe");
        assert_eq!(c.company, "Acme Corp");
        assert_eq!(c.designation, "Manager");
        assert_eq!(c.email, "john@acme.com");
        assert_eq!(c.address, "123 Main St, Springfield, 12345, USA");
    }

    #[test]
    fn test_vcard_n_fallback_and_folding() {
        let vcf = "BEGIN:VCARD\nN:Doe;Jane;;;\nNOTE:line one\n continued\nEND:VCARD\n";
        let contacts = parse_vcard_contacts(vcf.as_bytes());
        assert_eq!(contacts[0].name, "Jane Doe");
        assert_eq!(contacts[0].notes, "line onecontinued");
    }

    #[test]
    fn test_extract_text_binary_formats_empty() {
        assert!(extract_text(b"%PDF-1.4", FileType::Pdf).is_empty());
        assert!(extract_text(&[0xFF, 0xD8], FileType::Image).is_empty());
    }
}
