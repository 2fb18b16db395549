//! HTTP API for the chat assistant: sessions, chat, history, and knowledge entry

pub mod handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod types;

pub use server::build_router;
pub use server::serve_api;
