//! Provider of last resort: synthesizes LinkedIn URLs from the term itself.

use crate::clients::{ProviderError, SearchProvider};
use crate::constants::discovery::COMPANY_URL_PREFIX;
use crate::constants::guess::{CONFIDENCE_STEP, MAX_GUESSES, MIN_CONFIDENCE, START_CONFIDENCE};
use crate::domain::{CandidateResult, ResultSource, SearchTerm};
use crate::services::scoring::round_confidence;

pub const NAME: &str = "guess";

#[derive(Debug, Clone, Copy, Default)]
pub struct GuessGenerator;

impl GuessGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Deterministic, never fails, between one and [`MAX_GUESSES`] entries.
    #[must_use]
    pub fn generate(&self, term: &SearchTerm) -> Vec<CandidateResult> {
        let mut slugs = slug_variations(term.as_str());
        if slugs.is_empty() {
            slugs.push(term.compact());
        }

        slugs
            .into_iter()
            .enumerate()
            .take(MAX_GUESSES)
            .map(|(index, slug)| CandidateResult {
                url: format!("{COMPANY_URL_PREFIX}{slug}"),
                company_name: term.original().to_string(),
                vanity_name: slug,
                description: format!(
                    "Suggested LinkedIn URL for \"{}\" (not verified by a search result)",
                    term.original()
                ),
                confidence: guess_confidence(index),
                source: ResultSource::Guess,
            })
            .collect()
    }
}

#[allow(clippy::cast_precision_loss)]
fn guess_confidence(index: usize) -> f64 {
    let value = (index as f64).mul_add(-CONFIDENCE_STEP, START_CONFIDENCE);
    round_confidence(value.max(MIN_CONFIDENCE))
}

/// Hyphenated, hyphen-stripped, space-stripped and first-word forms, in that
/// order, without duplicates or single-character slugs. Letters and digits
/// of any script are kept.
fn slug_variations(term: &str) -> Vec<String> {
    let sanitized: String = term
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let hyphenated = sanitized
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let hyphen_stripped = hyphenated.replace('-', "");
    let space_stripped: String = sanitized
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .trim_matches('-')
        .to_string();
    let first_word = sanitized
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches('-')
        .to_string();

    let mut variations: Vec<String> = Vec::new();
    for slug in [hyphenated, hyphen_stripped, space_stripped, first_word] {
        if slug.chars().count() > 1 && !variations.contains(&slug) {
            variations.push(slug);
        }
    }
    variations
}

#[async_trait::async_trait]
impl SearchProvider for GuessGenerator {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn search(&self, term: &SearchTerm) -> Result<Vec<CandidateResult>, ProviderError> {
        Ok(self.generate(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(raw: &str) -> SearchTerm {
        SearchTerm::parse(raw).unwrap()
    }

    #[test]
    fn test_slug_variations() {
        assert_eq!(
            slug_variations("goldman sachs group"),
            vec!["goldman-sachs-group", "goldmansachsgroup", "goldman"]
        );
        assert_eq!(slug_variations("microsoft"), vec!["microsoft"]);
        assert_eq!(
            slug_variations("coca-cola company"),
            vec!["coca-cola-company", "cocacolacompany", "coca-colacompany", "coca-cola"]
        );
    }

    #[test]
    fn test_slug_variations_drop_punctuation_and_short_slugs() {
        assert_eq!(slug_variations("at&t"), vec!["att"]);
        assert!(slug_variations("!!").is_empty());
        assert_eq!(slug_variations("x y"), vec!["x-y", "xy"]);
    }

    #[test]
    fn test_slug_variations_keep_non_ascii_letters() {
        assert_eq!(slug_variations("яндекс"), vec!["яндекс"]);
        assert_eq!(slug_variations("nestlé"), vec!["nestlé"]);
        assert_eq!(
            slug_variations("株式会社 ソニー"),
            vec!["株式会社-ソニー", "株式会社ソニー", "株式会社"]
        );
    }

    #[test]
    fn test_generate_is_never_empty() {
        let generator = GuessGenerator::new();

        for raw in ["Яндекс", "株式会社 ソニー", "Nestlé", "!!", "a b", "- -"] {
            let guesses = generator.generate(&term(raw));
            assert!(!guesses.is_empty(), "no guesses for {raw:?}");
            assert!(guesses.len() <= MAX_GUESSES);
        }

        let punctuation = generator.generate(&term("!!"));
        assert_eq!(punctuation.len(), 1);
        assert_eq!(punctuation[0].vanity_name, "!!");
        assert!((punctuation[0].confidence - 0.30).abs() < f64::EPSILON);

        let cyrillic = generator.generate(&term("Яндекс"));
        assert_eq!(cyrillic[0].url, "https://www.linkedin.com/company/яндекс");
        assert_eq!(cyrillic[0].company_name, "Яндекс");
    }

    #[test]
    fn test_generate_returns_at_most_two_with_decreasing_confidence() {
        let guesses = GuessGenerator::new().generate(&term("Goldman Sachs Group"));

        assert_eq!(guesses.len(), 2);
        assert_eq!(
            guesses[0].url,
            "https://www.linkedin.com/company/goldman-sachs-group"
        );
        assert_eq!(guesses[0].vanity_name, "goldman-sachs-group");
        assert!((guesses[0].confidence - 0.30).abs() < f64::EPSILON);
        assert!((guesses[1].confidence - 0.25).abs() < f64::EPSILON);
        assert!(guesses.iter().all(|g| g.source.is_guess()));
        assert!(guesses.iter().all(|g| g.company_name == "Goldman Sachs Group"));
    }

    #[test]
    fn test_guess_confidence_floor() {
        assert!((guess_confidence(0) - 0.30).abs() < f64::EPSILON);
        assert!((guess_confidence(3) - 0.15).abs() < f64::EPSILON);
        assert!((guess_confidence(10) - 0.15).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_provider_never_fails() {
        let results = GuessGenerator::new().search(&term("Stripe")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].vanity_name, "stripe");
        assert!(results[0].description.contains("not verified"));
    }
}
