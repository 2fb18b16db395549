use serde::Deserialize;
use serde::Serialize;

/// One knowledge-base row: a set of question aliases sharing one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question_variants: Vec<String>,
    pub answer_text: String,
    pub image_ref: Option<String>,
}

impl KnowledgeEntry {
    /// Build an entry from raw sheet cells.
    ///
    /// The question cell is split on commas and every trimmed, non-empty
    /// segment becomes an alias, repeats included, so index rows line up
    /// one-to-one with the cell's segments. An empty image cell means no
    /// illustration. Returns `None` when the question cell yields no alias.
    pub fn from_cells(question_cell: &str, answer_cell: &str, image_cell: &str) -> Option<Self> {
        let question_variants: Vec<String> = question_cell
            .split(',')
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string)
            .collect();
        if question_variants.is_empty() {
            return None;
        }

        let image = image_cell.trim();
        Some(Self {
            question_variants,
            answer_text: answer_cell.to_string(),
            image_ref: (!image.is_empty()).then(|| image.to_string()),
        })
    }
}

/// A single matchable alias joined to the answer and image of its entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedQuestion {
    pub question: String,
    pub answer: String,
    pub image_ref: Option<String>,
}

/// Flattened view of every alias in the knowledge base, in load order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIndex {
    rows: Vec<IndexedQuestion>,
}

impl QueryIndex {
    /// Flatten entries into one row per alias
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a KnowledgeEntry>,
    {
        let rows = entries
            .into_iter()
            .flat_map(|entry| {
                entry.question_variants.iter().map(|q| IndexedQuestion {
                    question: q.clone(),
                    answer: entry.answer_text.clone(),
                    image_ref: entry.image_ref.clone(),
                })
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[IndexedQuestion] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&IndexedQuestion> {
        self.rows.get(index)
    }

    /// Matchable question aliases, in index order
    pub fn questions(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.question.as_str()).collect()
    }

    /// Answers parallel to [`Self::questions`]
    pub fn answers(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.answer.as_str()).collect()
    }

    /// Image references parallel to [`Self::questions`]
    pub fn image_refs(&self) -> Vec<Option<&str>> {
        self.rows.iter().map(|r| r.image_ref.as_deref()).collect()
    }
}

/// Outcome of matching a query against the indexed questions.
///
/// `index` is `Some` only when `score` reached the threshold. On rejection
/// `score` still carries the best observed similarity and `closest_index`
/// the position that produced it, for "closest score was N" diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_question: Option<String>,
    pub score: f64,
    pub index: Option<usize>,
    pub closest_index: Option<usize>,
}

impl MatchResult {
    /// Rejection with no candidate at all
    pub fn empty() -> Self {
        Self {
            matched_question: None,
            score: 0.0,
            index: None,
            closest_index: None,
        }
    }

    pub fn accepted(question: impl Into<String>, score: f64, index: usize) -> Self {
        Self {
            matched_question: Some(question.into()),
            score,
            index: Some(index),
            closest_index: Some(index),
        }
    }

    pub fn rejected(score: f64, closest_index: Option<usize>) -> Self {
        Self {
            matched_question: None,
            score,
            index: None,
            closest_index,
        }
    }

    pub fn is_match(&self) -> bool {
        self.index.is_some()
    }
}

/// A record appended to the input sheet by the knowledge entry form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub image_filename: Option<String>,
    /// `%Y-%m-%d %H:%M:%S`; filled in at append time when empty
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub surgeon: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub surgery_name: String,
    /// Comma separated device list
    #[serde(default)]
    pub surgery_devices: String,
    /// Comma separated tool list
    #[serde(default)]
    pub surgery_tools: String,
}

impl KnowledgeRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    /// Only question and answer are required
    pub fn validate(&self) -> crate::Result<()> {
        if self.question.trim().is_empty() {
            return Err(crate::ScrubMateError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }
        if self.answer.trim().is_empty() {
            return Err(crate::ScrubMateError::InvalidInput(
                "answer must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
