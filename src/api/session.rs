//! Session management for interactive chat
//!
//! Each logged-in user owns one [`ChatSession`]: the live conversation, the
//! archive of earlier chat logs, and the guideline flag. Sessions live in
//! memory only and are dropped after the configured idle timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::assistant::UNTITLED_CHAT;
use crate::errors::Result;
use crate::errors::ScrubMateError;
use crate::llm::SYSTEM_MESSAGE;

const LOG_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

fn now_datetime() -> String {
    chrono::Local::now().format(LOG_DATETIME_FORMAT).to_string()
}

/// Chat log id: local time down to microseconds
fn new_chat_id() -> String {
    chrono::Local::now().format("%Y%m%d%H%M%S%6f").to_string()
}

/// Chat message in conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "system", "user" or "assistant"
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub timestamp: u64,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>, image_ref: Option<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            image_ref,
            timestamp: now_secs(),
        }
    }

    fn system() -> Self {
        Self::new("system", SYSTEM_MESSAGE, None)
    }
}

/// One archived conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLog {
    pub title: String,
    /// `%Y-%m-%d %H:%M:%S`, local time
    pub datetime: String,
    /// Conversation without the system message
    pub messages: Vec<ChatMessage>,
}

/// Listing entry for a chat log
#[derive(Debug, Clone, Serialize)]
pub struct ChatLogSummary {
    pub id: String,
    pub title: String,
    pub datetime: String,
    pub message_count: usize,
}

/// Chat session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub username: String,
    /// Live conversation; always starts with the system message
    pub messages: Vec<ChatMessage>,
    pub current_chat_id: Option<String>,
    pub chat_logs: HashMap<String, ChatLog>,
    pub show_guidelines: bool,
    pub created_at: u64,
    pub last_activity: u64,
}

impl ChatSession {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        let now = now_secs();
        Self {
            session_id: Uuid::new_v4().to_string(),
            username: username.into(),
            messages: vec![ChatMessage::system()],
            current_chat_id: None,
            chat_logs: HashMap::new(),
            show_guidelines: true,
            created_at: now,
            last_activity: now,
        }
    }

    /// Messages after the system message
    pub fn conversation(&self) -> &[ChatMessage] {
        self.messages.get(1..).unwrap_or_default()
    }

    fn title(&self) -> String {
        self.messages
            .iter()
            .find(|m| m.role == "user")
            .map_or_else(|| UNTITLED_CHAT.to_string(), |m| m.content.clone())
    }

    /// Record a user message, opening a chat log on the first one
    pub fn add_user_message(&mut self, content: &str) {
        self.show_guidelines = false;

        let chat_id = match &self.current_chat_id {
            Some(id) => id.clone(),
            None => {
                let id = new_chat_id();
                self.chat_logs.insert(
                    id.clone(),
                    ChatLog {
                        title: content.to_string(),
                        datetime: now_datetime(),
                        messages: Vec::new(),
                    },
                );
                self.current_chat_id = Some(id.clone());
                id
            }
        };

        self.push(&chat_id, ChatMessage::new("user", content, None));
    }

    /// Record an assistant reply in the live conversation and its log
    pub fn add_assistant_message(&mut self, content: &str, image_ref: Option<String>) {
        let message = ChatMessage::new("assistant", content, image_ref);
        match self.current_chat_id.clone() {
            Some(chat_id) => self.push(&chat_id, message),
            None => {
                self.last_activity = message.timestamp;
                self.messages.push(message);
            }
        }
    }

    fn push(&mut self, chat_id: &str, message: ChatMessage) {
        self.last_activity = message.timestamp;
        if let Some(log) = self.chat_logs.get_mut(chat_id) {
            log.messages.push(message.clone());
        }
        self.messages.push(message);
    }

    /// Store the live conversation under its chat id
    fn archive_current(&mut self) {
        if self.messages.len() <= 1 {
            return;
        }
        let chat_id = self.current_chat_id.clone().unwrap_or_else(new_chat_id);
        let messages = self.conversation().to_vec();
        let title = self.title();
        match self.chat_logs.get_mut(&chat_id) {
            Some(log) => log.messages = messages,
            None => {
                self.chat_logs.insert(
                    chat_id,
                    ChatLog {
                        title,
                        datetime: now_datetime(),
                        messages,
                    },
                );
            }
        }
    }

    fn reset(&mut self) {
        self.messages = vec![ChatMessage::system()];
        self.current_chat_id = None;
        self.show_guidelines = true;
    }

    /// Archive the live conversation and start an empty one
    pub fn start_new_chat(&mut self) {
        self.archive_current();
        self.reset();
        self.last_activity = now_secs();
    }

    /// Archive the live conversation and switch to an archived one
    ///
    /// # Errors
    /// - `NotFound` when no log has this id; the live conversation is kept
    pub fn load_chat_log(&mut self, chat_id: &str) -> Result<()> {
        let Some(log) = self.chat_logs.get(chat_id) else {
            return Err(ScrubMateError::NotFound(format!("Chat log {chat_id}")));
        };
        let loaded = log.messages.clone();

        if self.current_chat_id.as_deref() != Some(chat_id) {
            self.archive_current();
        }

        self.messages = std::iter::once(ChatMessage::system()).chain(loaded).collect();
        self.current_chat_id = Some(chat_id.to_string());
        self.show_guidelines = false;
        self.last_activity = now_secs();
        Ok(())
    }

    /// Delete an archived log; deleting the open chat starts a fresh one
    ///
    /// # Errors
    /// - `NotFound` when no log has this id
    pub fn delete_chat_log(&mut self, chat_id: &str) -> Result<()> {
        if self.chat_logs.remove(chat_id).is_none() {
            return Err(ScrubMateError::NotFound(format!("Chat log {chat_id}")));
        }
        if self.current_chat_id.as_deref() == Some(chat_id) {
            self.reset();
        }
        self.last_activity = now_secs();
        Ok(())
    }

    /// Chat logs, newest first
    #[must_use]
    pub fn list_chat_logs(&self) -> Vec<ChatLogSummary> {
        let mut logs: Vec<ChatLogSummary> = self
            .chat_logs
            .iter()
            .map(|(id, log)| ChatLogSummary {
                id: id.clone(),
                title: log.title.clone(),
                datetime: log.datetime.clone(),
                message_count: log.messages.len(),
            })
            .collect();
        // the fixed-width datetime sorts lexically; the id breaks same-second ties
        logs.sort_by(|a, b| b.datetime.cmp(&a.datetime).then_with(|| b.id.cmp(&a.id)));
        logs
    }

    #[must_use]
    pub fn is_expired(&self, timeout_secs: u64) -> bool {
        now_secs().saturating_sub(self.last_activity) > timeout_secs
    }
}

/// Session manager with automatic cleanup
pub struct SessionManager {
    sessions: Arc<DashMap<String, ChatSession>>,
    session_timeout: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new(session_timeout_secs: u64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            session_timeout: Duration::from_secs(session_timeout_secs),
        }
    }

    /// Spawn the background task dropping idle sessions
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_cleanup(&self) {
        let sessions = Arc::clone(&self.sessions);
        let timeout_secs = self.session_timeout.as_secs();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Self::cleanup_expired_sessions(&sessions, timeout_secs);
            }
        });
    }

    #[must_use]
    pub fn create_session(&self, username: &str) -> ChatSession {
        let session = ChatSession::new(username);
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        session
    }

    #[must_use]
    pub fn get_session(&self, session_id: &str) -> Option<ChatSession> {
        self.sessions
            .get(session_id)
            .filter(|s| !s.is_expired(self.session_timeout.as_secs()))
            .map(|s| s.clone())
    }

    /// Run `f` on a live session, returning `None` if it does not exist
    pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut ChatSession) -> R) -> Option<R> {
        let timeout_secs = self.session_timeout.as_secs();
        let mut session = self.sessions.get_mut(session_id)?;
        if session.is_expired(timeout_secs) {
            return None;
        }
        Some(f(session.value_mut()))
    }

    pub fn delete_session(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn cleanup_expired_sessions(sessions: &DashMap<String, ChatSession>, timeout_secs: u64) {
        let expired: Vec<String> = sessions
            .iter()
            .filter(|entry| entry.value().is_expired(timeout_secs))
            .map(|entry| entry.key().clone())
            .collect();

        for session_id in expired {
            sessions.remove(&session_id);
            tracing::info!("Cleaned up expired session: {}", session_id);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(crate::config::default_session_timeout())
    }
}
