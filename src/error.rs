//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Provider failures are classified by the stage that produced them so the
//! HTTP layer can tell validation problems apart from upstream trouble.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Key phrase extraction error: {0}")]
    Extraction(String),

    #[error("Upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Asset persistence error: {0}")]
    Persistence(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<Error>,
    },

    #[error("Interrupted: {0}")]
    Interrupted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

/// Coarse error class reported to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Internal => "internal",
        }
    }
}

impl Error {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Translation(_)
            | Error::Extraction(_)
            | Error::Upstream { .. }
            | Error::Persistence(_)
            | Error::Interrupted(_) => ErrorKind::Upstream,
            Error::RetryExhausted { last, .. } => last.kind(),
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP status code surfaced to API callers.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Upstream {
                status: Some(status),
                ..
            } if (400..=599).contains(status) => *status,
            Error::Upstream { .. }
            | Error::Translation(_)
            | Error::Extraction(_)
            | Error::Persistence(_) => 502,
            Error::RetryExhausted { last, .. } => last.status_code(),
            Error::Interrupted(_) => 503,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = Error::Validation("unknown mood".to_string());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_upstream_keeps_provider_status() {
        let err = Error::upstream(Some(429), "rate limited");
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.kind(), ErrorKind::Upstream);

        let err = Error::upstream(None, "malformed payload");
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_retry_exhausted_reports_last_error() {
        let err = Error::RetryExhausted {
            attempts: 5,
            last: Box::new(Error::upstream(Some(503), "busy")),
        };
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("5 attempts"));
        assert!(err.to_string().contains("busy"));
    }

    #[test]
    fn test_stage_failures_map_to_bad_gateway() {
        for err in [
            Error::Translation("no reply".to_string()),
            Error::Extraction("no document".to_string()),
            Error::Persistence("upload failed".to_string()),
            Error::upstream(Some(200), "empty body"),
        ] {
            assert_eq!(err.status_code(), 502, "{}", err);
            assert_eq!(err.kind(), ErrorKind::Upstream);
        }
        assert_eq!(Error::Interrupted("shutdown".to_string()).status_code(), 503);
    }

    #[test]
    fn test_internal_errors_map_to_500() {
        let err = Error::Invariant("task panicked".to_string());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.kind(), ErrorKind::Internal);

        let err = Error::Config("OPENAI_API_KEY not set".to_string());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
