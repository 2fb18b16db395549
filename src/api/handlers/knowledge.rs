/// Knowledge base handlers
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use super::AppState;
use super::SESSION_EXPIRED;
use crate::api::types::ApiResponse;
use crate::api::types::KnowledgeAppendRequest;
use crate::api::types::KnowledgeItem;
use crate::api::types::SessionRequest;
use crate::ScrubMateError;

/// List every indexed question (GET /api/knowledge)
pub async fn list_knowledge(
    State(state): State<AppState>,
    Query(req): Query<SessionRequest>,
) -> Result<Json<ApiResponse<Vec<KnowledgeItem>>>, StatusCode> {
    if state.session_manager.get_session(&req.session_id).is_none() {
        return Ok(Json(ApiResponse::error(SESSION_EXPIRED)));
    }

    let index = state.assistant.knowledge().index().await.map_err(|e| {
        error!("Failed to load knowledge base: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let items = index
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| KnowledgeItem {
            index: i,
            question: row.question.clone(),
            answer: row.answer.clone(),
            image_ref: row.image_ref.clone(),
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}

/// Append a record to the input sheet (POST /api/knowledge)
pub async fn append_knowledge(
    State(state): State<AppState>,
    Json(req): Json<KnowledgeAppendRequest>,
) -> Result<Json<ApiResponse<()>>, StatusCode> {
    if state.session_manager.get_session(&req.session_id).is_none() {
        return Ok(Json(ApiResponse::error(SESSION_EXPIRED)));
    }
    info!("POST /api/knowledge: {}", req.record.question);

    match state.assistant.knowledge().append(&req.record).await {
        Ok(()) => Ok(Json(ApiResponse::success(()))),
        Err(ScrubMateError::InvalidInput(message)) => Ok(Json(ApiResponse::error(message))),
        Err(e) => {
            error!("Failed to save knowledge record: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
