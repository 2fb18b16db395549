//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Session endpoints
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        // Chat endpoints
        .route("/chat", post(handlers::chat))
        .route("/chat/stream", post(handlers::chat_stream))
        // Chat history
        .route("/chats", get(handlers::list_chats))
        .route("/chats/new", post(handlers::new_chat))
        .route(
            "/chats/:id",
            get(handlers::load_chat).delete(handlers::delete_chat),
        )
        // Knowledge base
        .route(
            "/knowledge",
            get(handlers::list_knowledge).post(handlers::append_knowledge),
        )
        .with_state(state)
}
