use regex::Regex;
use std::sync::OnceLock;

use super::get_regex;
use crate::constants::discovery::{COMPANY_URL_MARKER, MAX_DESCRIPTION_CHARS, UNKNOWN_COMPANY};

/// Order matters: `&amp;` is decoded before `&nbsp;` so that a double-encoded
/// `&amp;nbsp;` ends up as a plain space.
const ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#x27;", "'"),
    ("&#39;", "'"),
    ("&nbsp;", " "),
];

/// Fields pulled out of one raw search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub company_name: String,
    pub vanity_name: String,
    pub description: String,
}

#[must_use]
pub fn extract(title: &str, description: &str, url: &str) -> Extracted {
    let description = clean_description(description);
    Extracted {
        company_name: company_name(title, &description),
        vanity_name: vanity_name(url),
        description,
    }
}

/// True for `linkedin.com/company/<slug>` URLs with a non-empty slug.
#[must_use]
pub fn is_company_url(url: &str) -> bool {
    url.to_lowercase().contains(COMPANY_URL_MARKER) && !vanity_name(url).is_empty()
}

#[must_use]
pub fn vanity_name(url: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)linkedin\.com/company/([^/?]+)");

    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn company_name(title: &str, cleaned_description: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"^([^|]+)");

    let decoded = decode_entities(title);
    if let Some(name) = re
        .captures(&decoded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
    {
        return name.to_string();
    }

    let words: Vec<&str> = cleaned_description.split_whitespace().take(3).collect();
    if words.is_empty() {
        UNKNOWN_COMPANY.to_string()
    } else {
        words.join(" ")
    }
}

#[must_use]
pub fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        })
}

#[must_use]
pub fn clean_description(raw: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let tags = get_regex(&TAGS, r"<[^>]*>");
    let whitespace = get_regex(&WHITESPACE, r"\s+");

    let decoded = decode_entities(raw);
    let stripped = tags.replace_all(&decoded, "");
    let collapsed = whitespace.replace_all(&stripped, " ");

    collapsed
        .trim()
        .chars()
        .take(MAX_DESCRIPTION_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_name_strips_linkedin_suffix() {
        let extracted = extract(
            "Microsoft | LinkedIn",
            "anything",
            "https://www.linkedin.com/company/microsoft/",
        );
        assert_eq!(extracted.company_name, "Microsoft");
    }

    #[test]
    fn test_company_name_without_suffix() {
        assert_eq!(company_name("Goldman Sachs", ""), "Goldman Sachs");
        assert_eq!(company_name("AT&amp;T | LinkedIn", ""), "AT&T");
    }

    #[test]
    fn test_company_name_falls_back_to_description() {
        assert_eq!(
            company_name("| LinkedIn", "Leading global investment bank."),
            "Leading global investment"
        );
        assert_eq!(company_name("", "Acme"), "Acme");
    }

    #[test]
    fn test_company_name_unknown() {
        assert_eq!(company_name("  ", ""), UNKNOWN_COMPANY);
    }

    #[test]
    fn test_vanity_name() {
        assert_eq!(
            vanity_name("https://www.linkedin.com/company/microsoft/"),
            "microsoft"
        );
        assert_eq!(
            vanity_name("https://LinkedIn.com/Company/goldman-sachs?trk=abc"),
            "goldman-sachs"
        );
        assert_eq!(
            vanity_name("https://www.linkedin.com/company/stripe/about/"),
            "stripe"
        );
        assert_eq!(vanity_name("https://www.linkedin.com/in/someone/"), "");
    }

    #[test]
    fn test_is_company_url() {
        assert!(is_company_url("https://www.linkedin.com/company/microsoft/"));
        assert!(is_company_url("https://uk.LINKEDIN.com/company/bbc"));
        assert!(!is_company_url("https://www.linkedin.com/in/satya/"));
        assert!(!is_company_url("https://www.linkedin.com/company/"));
        assert!(!is_company_url("https://microsoft.com/company/about"));
    }

    #[test]
    fn test_clean_description_decodes_double_encoded_nbsp() {
        let cleaned = clean_description("&amp;nbsp;Leading&nbsp;tech&nbsp;company");
        assert_eq!(cleaned, "Leading tech company");
        assert!(!cleaned.contains('&'));
    }

    #[test]
    fn test_clean_description_strips_tags_and_collapses_whitespace() {
        let cleaned = clean_description("<b>Acme</b>   &lt;i&gt;Corp&lt;/i&gt;\n\n &quot;rockets&#39;");
        assert_eq!(cleaned, "Acme Corp \"rockets'");
    }

    #[test]
    fn test_clean_description_truncates() {
        let long = "word ".repeat(100);
        let cleaned = clean_description(&long);
        assert_eq!(cleaned.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_clean_description_truncates_on_char_boundary() {
        let long = "é".repeat(250);
        assert_eq!(clean_description(&long).chars().count(), MAX_DESCRIPTION_CHARS);
    }
}
