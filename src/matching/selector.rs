//! Best match across all expanded query variants

use tracing::debug;

use crate::matching::expander::expand;
use crate::matching::expander::SynonymTable;
use crate::matching::fuzzy::best_match;
use crate::models::MatchResult;
use crate::models::QueryIndex;

/// Outcome of a selection, with the variant that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub result: MatchResult,
    /// Variant whose score was kept; `None` for an empty knowledge base
    pub variant: Option<String>,
    pub variants_tried: usize,
}

/// Match `raw_query` and its synonym variants against the index.
pub fn select_best(
    raw_query: &str,
    index: &QueryIndex,
    table: &SynonymTable,
    threshold: f64,
) -> MatchResult {
    select(raw_query, index, table, threshold).result
}

/// Like [`select_best`], also reporting which variant won.
///
/// Variants are scored in expansion order (raw query first) and a later
/// variant replaces the running best only with a strictly higher score, so
/// the literal query wins ties.
pub fn select(raw_query: &str, index: &QueryIndex, table: &SynonymTable, threshold: f64) -> Selection {
    if index.is_empty() {
        debug!("Knowledge base is empty, skipping match for: {}", raw_query);
        return Selection {
            result: MatchResult::empty(),
            variant: None,
            variants_tried: 0,
        };
    }

    let questions = index.questions();
    let variants = expand(raw_query, table);
    let variants_tried = variants.len();

    let mut best: Option<(MatchResult, String)> = None;
    for variant in variants {
        let result = best_match(&variant, &questions, threshold);
        debug!(
            "variant '{}' -> score {:.1} (index {:?})",
            variant, result.score, result.closest_index
        );
        if best.as_ref().map_or(true, |(b, _)| result.score > b.score) {
            best = Some((result, variant));
        }
    }

    match best {
        Some((result, variant)) => Selection {
            result,
            variant: Some(variant),
            variants_tried,
        },
        None => Selection {
            result: MatchResult::empty(),
            variant: None,
            variants_tried,
        },
    }
}
