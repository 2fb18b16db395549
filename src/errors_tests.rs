//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::ScrubMateError;

    // ====== Error Type Tests ======

    #[test]
    fn test_custom_error() {
        let error = ScrubMateError::Custom("Test error message".to_string());
        assert_eq!(format!("{error}"), "Test error message");
    }

    #[test]
    fn test_config_error() {
        let error = ScrubMateError::ConfigError("Invalid configuration".to_string());
        assert!(matches!(error, ScrubMateError::ConfigError(_)));
        assert!(format!("{error}").contains("configuration"));
    }

    #[test]
    fn test_out_of_range_message() {
        let error = ScrubMateError::OutOfRange { index: 7, len: 3 };
        let display = format!("{error}");
        assert!(display.contains('7'));
        assert!(display.contains('3'));
    }

    #[test]
    fn test_llm_error() {
        let error = ScrubMateError::LlmError("API call failed".to_string());
        assert!(matches!(error, ScrubMateError::LlmError(_)));
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: ScrubMateError = io_err.into();
        assert!(matches!(err, ScrubMateError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ScrubMateError = json_err.into();
        assert!(matches!(err, ScrubMateError::Serialization(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: ScrubMateError = toml_err.into();
        assert!(matches!(err, ScrubMateError::TomlParsing(_)));
    }

    #[test]
    fn test_question_mark_propagation() {
        fn read_missing() -> crate::Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here.toml")?)
        }
        assert!(matches!(read_missing(), Err(ScrubMateError::Io(_))));
    }
}
