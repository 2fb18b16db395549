//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::assistant::Assistant;
use crate::config::AppConfig;
use crate::Result;

/// Build the application router: `/api` plus static images under `/images`
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let images = ServeDir::new(state.config.images_dir());

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .nest_service("/images", images)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting ScrubMate API server...");

    // Initialize services
    let config = Arc::new(config.clone());
    let assistant = Arc::new(Assistant::from_config(&config)?);

    // Warm the knowledge cache so the first question is not slow
    let index = assistant.knowledge().index().await?;
    info!("📚 Knowledge base ready: {} questions", index.len());

    let state = AppState::new(Arc::clone(&config), assistant);
    state.session_manager.start_cleanup();

    let app = build_router(state, enable_cors);

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("📋 RESTful API available at http://{}/api", addr);
    info!("🖼️  Images served from {}", config.images_dir().display());
    info!("");
    info!("Available endpoints:");
    info!("  GET    /api/health        - Health check");
    info!("  POST   /api/login         - Open a session");
    info!("  POST   /api/logout        - Close a session");
    info!("  POST   /api/chat          - Ask a question");
    info!("  POST   /api/chat/stream   - Ask a question (SSE)");
    info!("  GET    /api/chats         - List chat logs");
    info!("  POST   /api/chats/new     - Start a new chat");
    info!("  GET    /api/chats/:id     - Load a chat log");
    info!("  DELETE /api/chats/:id     - Delete a chat log");
    info!("  GET    /api/knowledge     - List knowledge questions");
    info!("  POST   /api/knowledge     - Add a knowledge record");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use serde_json::json;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::knowledge::CsvKnowledgeStore;
    use crate::knowledge::KnowledgeBase;
    use crate::llm::StreamingResponse;
    use crate::llm::Summarizer;

    struct FirstLineSummarizer;

    #[async_trait::async_trait]
    impl Summarizer for FirstLineSummarizer {
        async fn summarize(
            &self,
            context_answer: &str,
            _user_query: &str,
        ) -> Result<StreamingResponse> {
            let first = crate::matching::core_summary(context_answer).to_string();
            Ok(StreamingResponse::from_chunks(vec![first]))
        }
    }

    /// Summarizer that streams "1. " then "Foley" and then fails
    struct BrokenSummarizer;

    #[async_trait::async_trait]
    impl Summarizer for BrokenSummarizer {
        async fn summarize(
            &self,
            _context_answer: &str,
            _user_query: &str,
        ) -> Result<StreamingResponse> {
            let chunks = futures::stream::iter(vec![
                Ok("1.".to_string()),
                Ok("Foley".to_string()),
                Err(crate::ScrubMateError::LlmError("connection reset".to_string())),
            ]);
            Ok(StreamingResponse::new(Box::pin(chunks)))
        }
    }

    fn test_state(dir: &std::path::Path, summarizer: Arc<dyn Summarizer>) -> AppState {
        std::fs::write(
            dir.join("Sheet1.csv"),
            "질문,답변,Image URL\n\"TUC 수술 준비, TUC 세팅\",\"1. Foley\n2. Resectoscope\",tuc.png\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.join("images")).unwrap();
        std::fs::write(dir.join("images").join("tuc.png"), b"png").unwrap();

        let mut config = AppConfig::default();
        config.knowledge.data_dir = dir.to_path_buf();
        config.knowledge.images_dir = dir.join("images");
        let config = Arc::new(config);

        let store = Arc::new(CsvKnowledgeStore::from_config(&config));
        let knowledge = Arc::new(KnowledgeBase::new(store));
        let assistant = Arc::new(Assistant::new(&config, knowledge, summarizer));
        AppState::new(config, assistant)
    }

    fn test_router(dir: &std::path::Path) -> Router {
        build_router(test_state(dir, Arc::new(FirstLineSummarizer)), false)
    }

    /// POST a chat message to the SSE endpoint; returns `(event, data)` pairs
    async fn stream_chat(app: &Router, session_id: &str, message: &str) -> Vec<(String, String)> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat/stream")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"session_id": session_id, "message": message}).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .split("\n\n")
            .filter(|block| !block.trim().is_empty())
            .map(|block| {
                let mut event = "message".to_string();
                let mut data = Vec::new();
                for line in block.lines() {
                    if let Some(name) = line.strip_prefix("event:") {
                        event = name.trim().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
                    }
                }
                (event, data.join("\n"))
            })
            .collect()
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(app: &Router) -> String {
        let (_, body) = send(
            app,
            "POST",
            "/api/login",
            Some(json!({"username": "ori", "password": "0"})),
        )
        .await;
        assert_eq!(body["success"], true);
        assert!(body["data"]["guidelines"].as_str().is_some());
        body["data"]["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (status, body) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["knowledge_questions"], 2);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (_, body) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({"username": "ori", "password": "wrong"})),
        )
        .await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_chat_flow() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());
        let session_id = login(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/chat",
            Some(json!({"session_id": session_id, "message": "TUC 세팅"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "1. Foley");
        assert_eq!(body["data"]["image_url"], "/images/tuc.png");
        let chat_id = body["data"]["chat_id"].as_str().unwrap().to_string();

        let (_, body) = send(&app, "GET", &format!("/api/chats?session_id={session_id}"), None).await;
        assert_eq!(body["data"]["chats"][0]["id"], chat_id.as_str());
        assert_eq!(body["data"]["chats"][0]["title"], "TUC 세팅");
        assert_eq!(body["data"]["chats"][0]["message_count"], 2);

        let (_, body) = send(
            &app,
            "DELETE",
            &format!("/api/chats/{chat_id}?session_id={session_id}"),
            None,
        )
        .await;
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_chat_requires_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let (_, body) = send(
            &app,
            "POST",
            "/api/chat",
            Some(json!({"session_id": "nope", "message": "TUC 세팅"})),
        )
        .await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Session not found or expired");
    }

    #[tokio::test]
    async fn test_knowledge_append_is_visible() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());
        let session_id = login(&app).await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/knowledge",
            Some(json!({
                "session_id": session_id,
                "question": "레이저 수술 준비",
                "answer": "보안경 착용",
                "room": "37"
            })),
        )
        .await;
        assert_eq!(body["success"], true);

        let (_, body) = send(&app, "GET", &format!("/api/knowledge?session_id={session_id}"), None).await;
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["question"], "레이저 수술 준비");
    }

    #[tokio::test]
    async fn test_serves_images() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let response = app
            .oneshot(Request::builder().uri("/images/tuc.png").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_stream_event_order() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(FirstLineSummarizer));
        let app = build_router(state.clone(), false);
        let session_id = login(&app).await;

        let events = stream_chat(&app, &session_id, "TUC 세팅").await;
        let names: Vec<&str> = events.iter().map(|(e, _)| e.as_str()).collect();
        assert_eq!(names, vec!["meta", "message", "done"]);

        let meta: Value = serde_json::from_str(&events[0].1).unwrap();
        assert_eq!(meta["matched_question"], "TUC 세팅");
        assert_eq!(meta["image_url"], "/images/tuc.png");
        assert_eq!(events[1].1, "1. Foley");

        let session = state.session_manager.get_session(&session_id).unwrap();
        assert_eq!(session.current_chat_id.as_deref(), Some(events[2].1.as_str()));
        let assistant = session.conversation().last().unwrap();
        assert_eq!(assistant.role, "assistant");
        assert_eq!(assistant.content, "1. Foley");
        assert_eq!(assistant.image_ref.as_deref(), Some("tuc.png"));
    }

    #[tokio::test]
    async fn test_chat_stream_failure_leaves_history() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(BrokenSummarizer));
        let app = build_router(state.clone(), false);
        let session_id = login(&app).await;

        let events = stream_chat(&app, &session_id, "TUC 세팅").await;
        let names: Vec<&str> = events.iter().map(|(e, _)| e.as_str()).collect();
        assert_eq!(names, vec!["meta", "message", "message", "error"]);
        assert!(events[3].1.contains("connection reset"));

        let session = state.session_manager.get_session(&session_id).unwrap();
        assert!(session.conversation().iter().all(|m| m.role != "assistant"));
        assert_eq!(session.conversation().len(), 1);
    }
}
