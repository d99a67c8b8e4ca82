//! API-layer error types.

use thiserror::Error;

/// Errors from platform API operations.
///
/// `Network` is a failed or unreachable request, `Status` a non-success
/// HTTP response, `Shape` a body that did not deserialize to the expected
/// type, `Rejected` a 2xx upload whose body carried a server error message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("{0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApiError::Status {
            status: 404,
            message: "not found".into(),
        };
        assert!(err.to_string().contains("404"));
        assert_eq!(err.status(), Some(404));

        let err = ApiError::Shape("expected array".into());
        assert!(err.to_string().contains("expected array"));
        assert_eq!(err.status(), None);

        let err = ApiError::Rejected("archive has no report".into());
        assert_eq!(err.to_string(), "archive has no report");
    }
}
