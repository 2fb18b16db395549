use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::matching::SynonymTable;

/// Environment variable that overrides `[llm].llm_key`
pub const LLM_KEY_ENV: &str = "PERPLEXITY_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout: u64,
}

pub(crate) fn default_llm_model() -> String {
    "sonar-pro".to_string()
}

pub(crate) fn default_temperature() -> f32 {
    0.2
}

pub(crate) fn default_max_tokens() -> usize {
    1024
}

pub(crate) fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_endpoint: "https://api.perplexity.ai".to_string(),
            llm_key: String::new(),
            llm_model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory holding the sheet files
    pub data_dir: PathBuf,
    /// Curated sheet (`Sheet1`)
    #[serde(default = "default_main_sheet")]
    pub main_sheet: String,
    /// Sheet that receives appended records (`Data_Input`)
    #[serde(default = "default_input_sheet")]
    pub input_sheet: String,
    /// Directory that bare image filenames resolve against
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
}

pub(crate) fn default_main_sheet() -> String {
    "Sheet1.csv".to_string()
}

pub(crate) fn default_input_sheet() -> String {
    "Data_Input.csv".to_string()
}

pub(crate) fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            main_sheet: default_main_sheet(),
            input_sheet: default_input_sheet(),
            images_dir: default_images_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

pub(crate) fn default_threshold() -> f64 {
    crate::matching::DEFAULT_THRESHOLD
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "ori".to_string(),
            password: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle seconds before a session is dropped
    #[serde(default = "default_session_timeout")]
    pub timeout: u64,
}

pub(crate) fn default_session_timeout() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: default_session_timeout(),
        }
    }
}

/// One `[[synonyms]]` entry: a canonical term and its interchangeable forms
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SynonymEntry {
    pub term: String,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Replaces the built-in synonym table when non-empty
    #[serde(default)]
    pub synonyms: Vec<SynonymEntry>,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and apply environment overrides
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            tracing::warn!("No config file found, using built-in defaults");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(LLM_KEY_ENV) {
            if !key.trim().is_empty() {
                self.llm.llm_key = key;
            }
        }
    }

    /// Reject values the matcher and server cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=100.0).contains(&self.matching.threshold) {
            return Err(crate::ScrubMateError::ConfigError(format!(
                "matching.threshold must be within 0..=100, got {}",
                self.matching.threshold
            )));
        }
        for entry in &self.synonyms {
            if entry.term.trim().is_empty() {
                return Err(crate::ScrubMateError::ConfigError(
                    "synonym entry with empty term".to_string(),
                ));
            }
            if entry.variants.iter().any(|v| v.trim().is_empty()) {
                return Err(crate::ScrubMateError::ConfigError(format!(
                    "synonym entry '{}' has an empty variant",
                    entry.term
                )));
            }
        }
        Ok(())
    }

    /// Build the synonym table, preferring the configured one
    pub fn synonym_table(&self) -> SynonymTable {
        if self.synonyms.is_empty() {
            SynonymTable::default()
        } else {
            SynonymTable::new(
                self.synonyms
                    .iter()
                    .map(|e| (e.term.clone(), e.variants.clone())),
            )
        }
    }

    /// Full path of the curated sheet
    pub fn main_sheet_path(&self) -> PathBuf {
        self.knowledge.data_dir.join(&self.knowledge.main_sheet)
    }

    /// Full path of the input sheet
    pub fn input_sheet_path(&self) -> PathBuf {
        self.knowledge.data_dir.join(&self.knowledge.input_sheet)
    }

    /// Get images directory
    pub fn images_dir(&self) -> &Path {
        &self.knowledge.images_dir
    }

    /// Get match threshold
    pub fn match_threshold(&self) -> f64 {
        self.matching.threshold
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM key
    pub fn llm_key(&self) -> &str {
        &self.llm.llm_key
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }
}
