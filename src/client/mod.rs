use thiserror::Error;

pub mod archive;
pub mod cdx;
pub mod headers;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("invalid archive timestamp: {0}")]
    Timestamp(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Longest response body prefix kept on a status error.
pub const STATUS_BODY_LIMIT: usize = 200;

impl ClientError {
    /// Status error carrying at most [`STATUS_BODY_LIMIT`] characters of the body.
    pub fn status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = match body.char_indices().nth(STATUS_BODY_LIMIT) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        ClientError::HttpStatus { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_body_is_truncated() {
        let page = "<html>".repeat(100);
        let ClientError::HttpStatus { status, body } =
            ClientError::status(StatusCode::NOT_FOUND, &page)
        else {
            panic!("expected a status error");
        };
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.chars().count(), STATUS_BODY_LIMIT + 3);
        assert!(body.ends_with("..."));
    }

    #[test]
    fn test_short_body_is_kept() {
        let err = ClientError::status(StatusCode::SERVICE_UNAVAILABLE, "busy");
        assert_eq!(err.to_string(), "HTTP status 503 Service Unavailable: busy");
    }
}
