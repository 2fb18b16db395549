//! Normalized edit-distance similarity and best-candidate search

use rapidfuzz::fuzz;

use crate::models::MatchResult;

/// Similarity of two strings on a 0-100 scale.
///
/// Normalized Indel similarity over Unicode scalar values:
/// `100 * 2 * LCS(a, b) / (len(a) + len(b))`. Symmetric; identical strings
/// score 100 (two empty strings included) and a non-empty string against
/// the empty string scores 0.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Find the candidate most similar to `query`.
///
/// The first candidate wins among equal scores. The result is accepted when
/// the best score is at least `threshold`; otherwise it is a rejection that
/// still reports the best score and where it was found.
pub fn best_match<S: AsRef<str>>(query: &str, candidates: &[S], threshold: f64) -> MatchResult {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = ratio(query, candidate.as_ref());
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }

    match best {
        None => MatchResult::empty(),
        Some((idx, score)) if score >= threshold => {
            MatchResult::accepted(candidates[idx].as_ref(), score, idx)
        }
        Some((idx, score)) => MatchResult::rejected(score, Some(idx)),
    }
}
