/// Login and logout handlers
use axum::extract::State;
use axum::Json;
use tracing::info;
use tracing::warn;

use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::LoginRequest;
use crate::api::types::LoginResponse;
use crate::api::types::SessionRequest;
use crate::assistant::GUIDELINES;

const INVALID_CREDENTIALS: &str = "아이디 또는 비밀번호가 올바르지 않습니다.";

/// Check credentials and open a session (POST /api/login)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Json<ApiResponse<LoginResponse>> {
    let auth = &state.config.auth;
    if req.username != auth.username || req.password != auth.password {
        warn!("Rejected login for '{}'", req.username);
        return Json(ApiResponse::error(INVALID_CREDENTIALS));
    }

    let session = state.session_manager.create_session(&req.username);
    info!("Created session {} for {}", session.session_id, req.username);

    Json(ApiResponse::success(LoginResponse {
        session_id: session.session_id,
        username: session.username,
        guidelines: session.show_guidelines.then(|| GUIDELINES.to_string()),
    }))
}

/// Close a session and drop its history (POST /api/logout)
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Json<ApiResponse<()>> {
    if state.session_manager.delete_session(&req.session_id) {
        info!("Session {} logged out", req.session_id);
        Json(ApiResponse::success(()))
    } else {
        Json(ApiResponse::error(super::SESSION_EXPIRED))
    }
}
