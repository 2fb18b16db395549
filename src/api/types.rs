//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::api::session::ChatLogSummary;
use crate::api::session::ChatMessage;
use crate::models::KnowledgeRecord;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub knowledge_questions: usize,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub session_id: String,
    pub username: String,
    /// Usage guide for the fresh conversation
    pub guidelines: Option<String>,
}

/// Request carrying only a session id
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

/// Chat message request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

/// What a reply was built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyMeta {
    pub matched_question: Option<String>,
    pub score: f64,
    pub image_ref: Option<String>,
    /// Image URL under `/images`, when the file exists
    pub image_url: Option<String>,
}

/// Chat reply
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReplyResponse {
    pub chat_id: Option<String>,
    pub message: String,
    #[serde(flatten)]
    pub meta: ReplyMeta,
}

/// Conversation view
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub chat_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub show_guidelines: bool,
}

/// Chat log listing
#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub current_chat_id: Option<String>,
    pub chats: Vec<ChatLogSummary>,
}

/// New knowledge record from the entry form
#[derive(Debug, Deserialize)]
pub struct KnowledgeAppendRequest {
    pub session_id: String,
    #[serde(flatten)]
    pub record: KnowledgeRecord,
}

/// One question of the knowledge index
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub index: usize,
    pub question: String,
    pub answer: String,
    pub image_ref: Option<String>,
}
