//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - ask: Questions, match diagnostics, and query expansion
//! - knowledge: Knowledge base listing and record entry
//! - serve: API server
//! - info: Configuration display

pub mod ask;
pub mod info;
pub mod knowledge;
pub mod serve;

use std::sync::Arc;

// Re-export all public handlers
pub use ask::*;
pub use info::*;
pub use knowledge::*;
pub use serve::*;

use crate::knowledge::CsvKnowledgeStore;
use crate::knowledge::KnowledgeBase;
use crate::AppConfig;

/// Knowledge base over the configured sheets, without an LLM
pub(crate) fn open_knowledge(config: &AppConfig) -> KnowledgeBase {
    KnowledgeBase::new(Arc::new(CsvKnowledgeStore::from_config(config)))
}
