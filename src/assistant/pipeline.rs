//! Complete chat pipeline: Match -> Resolve -> Summarize

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::assistant::EMPTY_KNOWLEDGE_MESSAGE;
use crate::assistant::NOT_FOUND_MESSAGE;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::knowledge::resolve_image_path;
use crate::knowledge::CsvKnowledgeStore;
use crate::knowledge::KnowledgeBase;
use crate::llm::LlmService;
use crate::llm::StreamingResponse;
use crate::llm::Summarizer;
use crate::matching::resolve;
use crate::matching::select;
use crate::matching::Selection;
use crate::matching::SynonymTable;
use crate::models::MatchResult;

/// How a reply was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// A question matched and its answer was summarized
    Answered,
    /// Nothing scored at or above the threshold
    NotFound,
    /// The knowledge base holds no questions
    EmptyKnowledge,
}

/// Reply to one user query
pub struct AssistantReply {
    pub outcome: ReplyOutcome,
    pub match_result: MatchResult,
    /// Image attached to the matched answer, if any
    pub image_ref: Option<String>,
    /// Reply text, streamed
    pub stream: StreamingResponse,
}

impl AssistantReply {
    fn fixed(outcome: ReplyOutcome, match_result: MatchResult, message: &str) -> Self {
        Self {
            outcome,
            match_result,
            image_ref: None,
            stream: StreamingResponse::from_chunks(vec![message.to_string()]),
        }
    }

    /// Wait for the full reply text
    pub async fn collect_text(self) -> Result<String> {
        self.stream.collect_all().await
    }
}

/// Chat assistant over a knowledge base and a summarizer
pub struct Assistant {
    knowledge: Arc<KnowledgeBase>,
    summarizer: Arc<dyn Summarizer>,
    synonyms: SynonymTable,
    threshold: f64,
    images_dir: PathBuf,
}

impl Assistant {
    /// Create an assistant backed by the configured CSV sheets and LLM
    ///
    /// # Errors
    /// - LLM configuration errors (missing API key)
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(CsvKnowledgeStore::from_config(config));
        let knowledge = Arc::new(KnowledgeBase::new(store));
        let summarizer = Arc::new(LlmService::new(config)?);
        Ok(Self::new(config, knowledge, summarizer))
    }

    /// Create from existing services
    #[must_use]
    pub fn new(
        config: &AppConfig,
        knowledge: Arc<KnowledgeBase>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            knowledge,
            summarizer,
            synonyms: config.synonym_table(),
            threshold: config.match_threshold(),
            images_dir: config.images_dir().to_path_buf(),
        }
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    /// Run the selector against the current index without summarizing
    ///
    /// # Errors
    /// - Knowledge store read errors
    pub async fn find_match(&self, query: &str) -> Result<Selection> {
        let index = self.knowledge.index().await?;
        Ok(select(query, &index, &self.synonyms, self.threshold))
    }

    /// Answer a user query
    ///
    /// # Errors
    /// - Knowledge store read errors
    /// - LLM request errors (connection failures, API errors)
    pub async fn answer(&self, query: &str) -> Result<AssistantReply> {
        info!("Processing query: {}", query);

        let index = self.knowledge.index().await?;
        if index.is_empty() {
            return Ok(AssistantReply::fixed(
                ReplyOutcome::EmptyKnowledge,
                MatchResult::empty(),
                EMPTY_KNOWLEDGE_MESSAGE,
            ));
        }

        // Step 1: match the query and its synonym variants
        let selection = select(query, &index, &self.synonyms, self.threshold);
        let Some(match_index) = selection.result.index else {
            info!(
                "No match above {:.0} (best score {:.1} over {} variants)",
                self.threshold, selection.result.score, selection.variants_tried
            );
            return Ok(AssistantReply::fixed(
                ReplyOutcome::NotFound,
                selection.result,
                NOT_FOUND_MESSAGE,
            ));
        };
        info!(
            "Matched '{}' with score {:.1} via '{}'",
            selection.result.matched_question.as_deref().unwrap_or_default(),
            selection.result.score,
            selection.variant.as_deref().unwrap_or(query)
        );

        // Step 2: look up the answer and its image
        let resolved = resolve(&index, match_index)?;
        if let Some(image_ref) = &resolved.image_ref {
            // a missing file only warns; the reference is still reported
            if let Some(path) = resolve_image_path(&self.images_dir, image_ref) {
                debug!("Attaching image {}", path.display());
            }
        }

        // Step 3: summarize the matched answer for this query
        let stream = self
            .summarizer
            .summarize(&resolved.answer_text, query)
            .await?;

        Ok(AssistantReply {
            outcome: ReplyOutcome::Answered,
            match_result: selection.result,
            image_ref: resolved.image_ref,
            stream,
        })
    }
}
