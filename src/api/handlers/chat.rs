/// Chat and chat-history handlers
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::Event;
use axum::response::sse::KeepAlive;
use axum::response::sse::Sse;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use futures::StreamExt;
use tracing::error;
use tracing::info;

use super::AppState;
use super::SESSION_EXPIRED;
use crate::api::types::ApiResponse;
use crate::api::types::ChatListResponse;
use crate::api::types::ChatReplyResponse;
use crate::api::types::ChatRequest;
use crate::api::types::ConversationResponse;
use crate::api::types::ReplyMeta;
use crate::api::types::SessionRequest;
use crate::assistant::AssistantReply;

const EMPTY_MESSAGE: &str = "Message must not be empty";

fn reply_meta(state: &AppState, reply: &AssistantReply) -> ReplyMeta {
    ReplyMeta {
        matched_question: reply.match_result.matched_question.clone(),
        score: reply.match_result.score,
        image_ref: reply.image_ref.clone(),
        image_url: state.image_url(reply.image_ref.as_deref()),
    }
}

/// Record the user message and run the assistant
async fn start_reply(state: &AppState, req: &ChatRequest) -> Result<AssistantReply, Response> {
    if req.message.trim().is_empty() {
        return Err(Json(ApiResponse::<()>::error(EMPTY_MESSAGE)).into_response());
    }

    let recorded = state
        .session_manager
        .with_session(&req.session_id, |s| s.add_user_message(&req.message));
    if recorded.is_none() {
        return Err(Json(ApiResponse::<()>::error(SESSION_EXPIRED)).into_response());
    }

    state.assistant.answer(&req.message).await.map_err(|e| {
        error!("Error answering chat message: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error("Failed to generate response")),
        )
            .into_response()
    })
}

/// Answer a chat message in one piece (POST /api/chat)
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    info!("POST /api/chat - session: {}", req.session_id);

    let reply = match start_reply(&state, &req).await {
        Ok(reply) => reply,
        Err(response) => return response,
    };
    let meta = reply_meta(&state, &reply);

    let message = match reply.collect_text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Reply stream failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to generate response")),
            )
                .into_response();
        }
    };

    let chat_id = state
        .session_manager
        .with_session(&req.session_id, |s| {
            s.add_assistant_message(&message, meta.image_ref.clone());
            s.current_chat_id.clone()
        })
        .flatten();

    Json(ApiResponse::success(ChatReplyResponse {
        chat_id,
        message,
        meta,
    }))
    .into_response()
}

/// Answer a chat message as server-sent events (POST /api/chat/stream)
///
/// Emits one `meta` event, then one unnamed event per text chunk, then a
/// `done` event carrying the chat id. A failing stream ends with `error`
/// and leaves the history untouched.
pub async fn chat_stream(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    info!("POST /api/chat/stream - session: {}", req.session_id);

    let reply = match start_reply(&state, &req).await {
        Ok(reply) => reply,
        Err(response) => return response,
    };
    let meta = serde_json::to_string(&reply_meta(&state, &reply)).unwrap_or_default();

    let sessions = Arc::clone(&state.session_manager);
    let session_id = req.session_id;
    let image_ref = reply.image_ref;
    let mut chunks = reply.stream.into_stream();

    let events = async_stream::stream! {
        yield Ok::<Event, Infallible>(Event::default().event("meta").data(meta));

        let mut text = String::new();
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => {
                    text.push_str(&chunk);
                    yield Ok(Event::default().data(chunk));
                }
                Err(e) => {
                    error!("Reply stream failed: {}", e);
                    yield Ok(Event::default().event("error").data(e.to_string()));
                    return;
                }
            }
        }

        let chat_id = if text.is_empty() {
            None
        } else {
            sessions
                .with_session(&session_id, |s| {
                    s.add_assistant_message(&text, image_ref.clone());
                    s.current_chat_id.clone()
                })
                .flatten()
        };
        yield Ok(Event::default().event("done").data(chat_id.unwrap_or_default()));
    };

    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

/// List chat logs, newest first (GET /api/chats)
pub async fn list_chats(
    State(state): State<AppState>,
    Query(req): Query<SessionRequest>,
) -> Json<ApiResponse<ChatListResponse>> {
    let listing = state.session_manager.with_session(&req.session_id, |s| ChatListResponse {
        current_chat_id: s.current_chat_id.clone(),
        chats: s.list_chat_logs(),
    });

    match listing {
        Some(listing) => Json(ApiResponse::success(listing)),
        None => Json(ApiResponse::error(SESSION_EXPIRED)),
    }
}

/// Switch to an archived chat (GET /api/chats/:id)
pub async fn load_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(req): Query<SessionRequest>,
) -> Json<ApiResponse<ConversationResponse>> {
    info!("GET /api/chats/{}", chat_id);

    let loaded = state.session_manager.with_session(&req.session_id, |s| {
        s.load_chat_log(&chat_id).map(|()| ConversationResponse {
            chat_id: s.current_chat_id.clone(),
            messages: s.conversation().to_vec(),
            show_guidelines: s.show_guidelines,
        })
    });

    match loaded {
        Some(Ok(conversation)) => Json(ApiResponse::success(conversation)),
        Some(Err(e)) => Json(ApiResponse::error(e.to_string())),
        None => Json(ApiResponse::error(SESSION_EXPIRED)),
    }
}

/// Delete an archived chat (DELETE /api/chats/:id)
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(req): Query<SessionRequest>,
) -> Json<ApiResponse<()>> {
    info!("DELETE /api/chats/{}", chat_id);

    match state
        .session_manager
        .with_session(&req.session_id, |s| s.delete_chat_log(&chat_id))
    {
        Some(Ok(())) => Json(ApiResponse::success(())),
        Some(Err(e)) => Json(ApiResponse::error(e.to_string())),
        None => Json(ApiResponse::error(SESSION_EXPIRED)),
    }
}

/// Archive the open chat and start a new one (POST /api/chats/new)
pub async fn new_chat(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Json<ApiResponse<ConversationResponse>> {
    let conversation = state.session_manager.with_session(&req.session_id, |s| {
        s.start_new_chat();
        ConversationResponse {
            chat_id: None,
            messages: Vec::new(),
            show_guidelines: s.show_guidelines,
        }
    });

    match conversation {
        Some(conversation) => Json(ApiResponse::success(conversation)),
        None => Json(ApiResponse::error(SESSION_EXPIRED)),
    }
}
