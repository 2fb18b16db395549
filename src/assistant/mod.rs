//! Chat assistant: knowledge lookup followed by LLM summarization
//!
//! A query flows through the cached knowledge index, the synonym-aware
//! selector and the answer resolver before the matched answer is handed to a
//! [`Summarizer`](crate::llm::Summarizer). Fixed replies cover an empty
//! knowledge base and queries that match nothing.
//!
//! # Examples
//!
//! ```rust,no_run
//! use scrubmate::assistant::Assistant;
//! use scrubmate::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let assistant = Assistant::from_config(&config)?;
//!
//!     let reply = assistant.answer("TUC 수술 세팅").await?;
//!     println!("{}", reply.collect_text().await?);
//!
//!     Ok(())
//! }
//! ```

pub mod pipeline;

pub use pipeline::Assistant;
pub use pipeline::AssistantReply;
pub use pipeline::ReplyOutcome;

/// Reply when no question scores at or above the threshold
pub const NOT_FOUND_MESSAGE: &str =
    "죄송합니다. 해당 정보를 찾을 수 없습니다.\n다른 질문이 있으신가요? \n예시) tuc 수술 준비";

/// Reply when the knowledge base holds no questions at all
pub const EMPTY_KNOWLEDGE_MESSAGE: &str =
    "질문 데이터가 없습니다. 구글 시트에 질문/답변을 입력해 주세요.";

/// Title of a chat log that has no user message yet
pub const UNTITLED_CHAT: &str = "새 대화";

/// Usage guide shown on a fresh conversation
pub const GUIDELINES: &str = "🏥 ORi 사용법
수술실 준비와 장비 배치 정보를 빠르게 제공합니다!

💡 이렇게 질문하세요
• 37번방 TUC 수술 세팅 방법
• TUC 수술 필요 장비

✨ 이런 답변을 받아요
• 핵심 정보 요약
• 관련 이미지/표 제공

⚠️ ORi는 참고용 정보입니다. 실제 업무 시 병원 프로토콜을 우선 따르세요!";
