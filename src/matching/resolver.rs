//! Positional lookup of the answer behind a selected match

use serde::Serialize;

use crate::errors::Result;
use crate::errors::ScrubMateError;
use crate::models::QueryIndex;

/// Answer text and optional illustration for a matched question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAnswer {
    pub answer_text: String,
    pub image_ref: Option<String>,
}

/// Look up the answer stored at `match_index`.
///
/// Only indices produced by a successful selection are valid here; anything
/// else is an internal error.
pub fn resolve(index: &QueryIndex, match_index: usize) -> Result<ResolvedAnswer> {
    let row = index.get(match_index).ok_or(ScrubMateError::OutOfRange {
        index: match_index,
        len: index.len(),
    })?;
    Ok(ResolvedAnswer {
        answer_text: row.answer.clone(),
        image_ref: row.image_ref.clone(),
    })
}

/// First line of an answer, trimmed
pub fn core_summary(answer: &str) -> &str {
    answer.lines().next().unwrap_or("").trim()
}
