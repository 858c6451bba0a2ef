//! Error taxonomy for the translation gateway.
//!
//! Validation and configuration problems are local and reported straight to
//! the caller. Upstream problems are transient from the caller's point of view
//! and are absorbed by the fallback/isolation policy of the gateway.

use thiserror::Error;

/// Input rejected before any cache or network interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text is too long ({len} characters, max {max})")]
    InputTooLarge { len: usize, max: usize },

    #[error("unsupported language code: '{0}'")]
    UnsupportedLanguage(String),

    #[error("batch is too large ({len} items, max {max})")]
    BatchTooLarge { len: usize, max: usize },

    #[error("batch contains no texts")]
    EmptyBatch,
}

impl ValidationError {
    /// Machine-readable reason, stable across releases.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::InputTooLarge { .. } => "input_too_large",
            ValidationError::UnsupportedLanguage(_) => "unsupported_language",
            ValidationError::BatchTooLarge { .. } => "batch_too_large",
            ValidationError::EmptyBatch => "empty_batch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("translation service is misconfigured: {0}")]
    Misconfigured(String),

    #[error("model {model} still loading after {attempts} attempts")]
    ModelUnavailable { model: String, attempts: u32 },

    #[error("upstream error ({}): {message}", .status.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string()))]
    UpstreamError { status: Option<u16>, message: String },

    #[error("unexpected response shape from upstream: {0}")]
    UnexpectedResponseShape(String),
}

impl TranslationError {
    /// Machine-readable reason used by the HTTP layer.
    pub fn reason(&self) -> &'static str {
        match self {
            TranslationError::Validation(e) => e.reason(),
            TranslationError::Misconfigured(_) => "misconfigured",
            TranslationError::ModelUnavailable { .. } => "model_unavailable",
            TranslationError::UpstreamError { .. } => "upstream_error",
            TranslationError::UnexpectedResponseShape(_) => "unexpected_response_shape",
        }
    }

    /// Whether the failure came from the upstream and may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TranslationError::ModelUnavailable { .. } | TranslationError::UpstreamError { .. }
        )
    }

    /// Errors that must reach the caller instead of being replaced by a fallback.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            TranslationError::Validation(_) | TranslationError::Misconfigured(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_reasons() {
        assert_eq!(
            ValidationError::InputTooLarge { len: 10, max: 5 }.reason(),
            "input_too_large"
        );
        assert_eq!(
            ValidationError::UnsupportedLanguage("xx".to_string()).reason(),
            "unsupported_language"
        );
        assert_eq!(
            ValidationError::BatchTooLarge { len: 30, max: 20 }.reason(),
            "batch_too_large"
        );
        assert_eq!(ValidationError::EmptyBatch.reason(), "empty_batch");
    }

    #[test]
    fn test_validation_converts_into_translation_error() {
        let err: TranslationError = ValidationError::UnsupportedLanguage("xx".to_string()).into();
        assert_eq!(err.reason(), "unsupported_language");
        assert!(err.is_local());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("'xx'"));
    }

    #[test]
    fn test_upstream_error_display_with_status() {
        let err = TranslationError::UpstreamError {
            status: Some(500),
            message: "boom".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("boom"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_upstream_error_display_without_status() {
        let err = TranslationError::UpstreamError {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("no status"));
    }

    #[test]
    fn test_misconfigured_is_local_not_transient() {
        let err = TranslationError::Misconfigured("HF_API_KEY not set".to_string());
        assert!(err.is_local());
        assert!(!err.is_transient());
        assert_eq!(err.reason(), "misconfigured");
    }

    #[test]
    fn test_model_unavailable_is_transient() {
        let err = TranslationError::ModelUnavailable {
            model: "Helsinki-NLP/opus-mt-en-es".to_string(),
            attempts: 4,
        };
        assert!(err.is_transient());
        assert!(!err.is_local());
        assert!(err.to_string().contains("4 attempts"));
    }

    #[test]
    fn test_unexpected_shape_is_neither_local_nor_transient() {
        let err = TranslationError::UnexpectedResponseShape("{}".to_string());
        assert!(!err.is_local());
        assert!(!err.is_transient());
    }
}
