//! Query matching core
//!
//! Decides which knowledge-base question, if any, a free-text query refers to:
//! - Synonym expansion of the raw query into equivalent variants
//! - Fuzzy similarity scoring of each variant against every indexed question
//! - Selection of the best variant result, literal query first on ties
//! - Resolution of the selected index to its answer and image
//!
//! Everything here is synchronous and pure; the [`QueryIndex`] is always
//! passed in by the caller.
//!
//! # Examples
//!
//! ```rust
//! use scrubmate::matching::{resolve, select_best, SynonymTable};
//! use scrubmate::models::{KnowledgeEntry, QueryIndex};
//!
//! let entries = vec![
//!     KnowledgeEntry::from_cells("TUC 수술 준비", "1. Foley 2. Resectoscope", "tuc.png").unwrap(),
//! ];
//! let index = QueryIndex::from_entries(&entries);
//!
//! let result = select_best("TUC 세팅", &index, SynonymTable::builtin(), 65.0);
//! let answer = resolve(&index, result.index.unwrap()).unwrap();
//! assert_eq!(answer.image_ref.as_deref(), Some("tuc.png"));
//! ```
//!
//! [`QueryIndex`]: crate::models::QueryIndex

pub mod expander;
pub mod fuzzy;
pub mod resolver;
pub mod selector;

pub use expander::expand;
pub use expander::SynonymTable;
pub use fuzzy::best_match;
pub use fuzzy::ratio;
pub use resolver::core_summary;
pub use resolver::resolve;
pub use resolver::ResolvedAnswer;
pub use selector::select;
pub use selector::select_best;
pub use selector::Selection;

/// Minimum similarity (0-100) for a match to be accepted
pub const DEFAULT_THRESHOLD: f64 = 65.0;
