//! Unit tests for configuration module
//!
//! These tests validate configuration parsing, defaults, and validation.

#[cfg(test)]
mod tests {
    use crate::config::*;

    // ====== Default Value Tests ======

    #[test]
    fn test_default_threshold() {
        assert!((default_threshold() - 65.0).abs() < f64::EPSILON);
        assert!((AppConfig::default().match_threshold() - 65.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_llm_model() {
        assert_eq!(default_llm_model(), "sonar-pro");
        assert_eq!(AppConfig::default().llm_endpoint(), "https://api.perplexity.ai");
    }

    #[test]
    fn test_default_sheet_paths() {
        let config = AppConfig::default();
        assert!(config.main_sheet_path().ends_with("Sheet1.csv"));
        assert!(config.input_sheet_path().ends_with("Data_Input.csv"));
        assert!(config.images_dir().ends_with("images"));
    }

    #[test]
    fn test_default_credentials() {
        let auth = AuthConfig::default();
        assert_eq!(auth.username, "ori");
        assert_eq!(auth.password, "0");
    }

    // ====== Parsing Tests ======

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.timeout, 3600);
        assert!(config.synonyms.is_empty());
    }

    #[test]
    fn test_parse_logging_level() {
        let config = AppConfig::from_toml_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.logging.level, "warn");

        // keys the config no longer reads are ignored
        let config =
            AppConfig::from_toml_str("[logging]\nlevel = \"debug\"\nbacktrace = true\n").unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
[matching]
threshold = 80.0

[knowledge]
data_dir = "/srv/kb"

[server]
host = "0.0.0.0"
port = 8080
cors = true
"#,
        )
        .unwrap();

        assert!((config.match_threshold() - 80.0).abs() < f64::EPSILON);
        assert_eq!(
            config.main_sheet_path(),
            std::path::PathBuf::from("/srv/kb/Sheet1.csv")
        );
        assert!(config.server.cors);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_parse_synonym_override() {
        let config = AppConfig::from_toml_str(
            r#"
[[synonyms]]
term = "봉합"
variants = ["suture", "꿰매기"]
"#,
        )
        .unwrap();

        let table = config.synonym_table();
        assert_eq!(table.len(), 1);
        let (term, variants) = table.iter().next().unwrap();
        assert_eq!(term, "봉합");
        assert_eq!(variants, ["suture".to_string(), "꿰매기".to_string()]);
    }

    #[test]
    fn test_builtin_synonyms_when_not_configured() {
        let table = AppConfig::default().synonym_table();
        assert_eq!(table.len(), 5);
    }

    // ====== Validation Tests ======

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let result = AppConfig::from_toml_str("[matching]\nthreshold = 120.0\n");
        assert!(matches!(
            result,
            Err(crate::ScrubMateError::ConfigError(_))
        ));
    }

    #[test]
    fn test_empty_synonym_variant_rejected() {
        let result = AppConfig::from_toml_str(
            r#"
[[synonyms]]
term = "장비"
variants = ["기구", "  "]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[auth]\nusername = \"nurse\"\npassword = \"pw\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.auth.username, "nurse");
        assert_eq!(config.auth.password, "pw");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AppConfig::from_file("/nonexistent/scrubmate.toml");
        assert!(matches!(result, Err(crate::ScrubMateError::Io(_))));
    }
}
