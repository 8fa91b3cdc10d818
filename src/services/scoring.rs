//! Confidence scoring for search hits.
//!
//! Scores are additive from a fixed base and land in a small discrete set
//! (0.60 to 0.95 in 0.05 steps). Downstream consumers compare them against
//! display thresholds, so the constants in [`crate::constants::scoring`] must
//! not drift.

use std::cmp::Ordering;

use crate::clients::RawHit;
use crate::constants::scoring::{
    BASE, FIRST_RESULT_BONUS, MAX_CONFIDENCE, NAME_MATCH_BONUS, SLUG_MATCH_BONUS,
};
use crate::domain::{CandidateResult, ResultSource, SearchTerm};
use crate::parser::{extract, is_company_url};

#[must_use]
pub fn score(company_name: &str, vanity_name: &str, term: &SearchTerm, is_first: bool) -> f64 {
    let mut confidence = BASE;

    if name_matches(company_name, term) {
        confidence += NAME_MATCH_BONUS;
    }

    if is_first {
        confidence += FIRST_RESULT_BONUS;
    }

    if vanity_name.to_lowercase().contains(&term.compact()) {
        confidence += SLUG_MATCH_BONUS;
    }

    round_confidence(confidence.min(MAX_CONFIDENCE))
}

fn name_matches(company_name: &str, term: &SearchTerm) -> bool {
    let name = company_name.to_lowercase();
    if name.contains(term.as_str()) {
        return true;
    }

    name.split_whitespace()
        .next()
        .is_some_and(|first_word| term.as_str().contains(first_word))
}

#[must_use]
pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Stable: equal scores keep provider order.
pub fn sort_by_confidence(results: &mut [CandidateResult]) {
    results.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
}

/// Filters non-company URLs, extracts fields and scores what is left.
///
/// "First result" means the first hit that survived the URL filter.
#[must_use]
pub fn score_hits(hits: &[RawHit], term: &SearchTerm) -> Vec<CandidateResult> {
    let mut results: Vec<CandidateResult> = hits
        .iter()
        .filter(|hit| is_company_url(&hit.url))
        .enumerate()
        .map(|(index, hit)| {
            let extracted = extract(&hit.title, &hit.snippet, &hit.url);
            let confidence = score(
                &extracted.company_name,
                &extracted.vanity_name,
                term,
                index == 0,
            );

            CandidateResult {
                url: hit.url.clone(),
                company_name: extracted.company_name,
                vanity_name: extracted.vanity_name,
                description: extracted.description,
                confidence,
                source: ResultSource::Search,
            }
        })
        .collect();

    sort_by_confidence(&mut results);
    results
}
