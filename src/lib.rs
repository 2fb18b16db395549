pub mod api;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod errors;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod matching;
pub mod models;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod errors_tests;

pub use config::AppConfig;
pub use errors::*;
