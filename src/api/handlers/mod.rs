/// API request handlers
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::warn;

use crate::api::session::SessionManager;
use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::assistant::Assistant;
use crate::config::AppConfig;
use crate::knowledge::resolve_image_path;

// Re-export sub-modules
pub mod auth;
pub mod chat;
pub mod knowledge;

// Re-export handlers
pub use auth::*;
pub use chat::*;
pub use knowledge::*;

pub(crate) const SESSION_EXPIRED: &str = "Session not found or expired";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub assistant: Arc<Assistant>,
    pub session_manager: Arc<SessionManager>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, assistant: Arc<Assistant>) -> Self {
        let session_manager = Arc::new(SessionManager::new(config.session.timeout));
        Self {
            config,
            assistant,
            session_manager,
        }
    }

    /// Public URL of an image reference, when the file exists
    pub(crate) fn image_url(&self, image_ref: Option<&str>) -> Option<String> {
        let image_ref = image_ref?;
        resolve_image_path(self.config.images_dir(), image_ref)
            .map(|_| format!("/images/{}", image_ref.trim()))
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let (status, knowledge_questions) = match state.assistant.knowledge().index().await {
        Ok(index) => ("healthy", index.len()),
        Err(e) => {
            warn!("Knowledge base unavailable: {}", e);
            ("degraded", 0)
        }
    };

    Json(ApiResponse::success(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        knowledge_questions,
    }))
}
