use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be invalid or expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Pull the human-readable message out of an error body.
    /// The service usually answers `{"message": "..."}` but some endpoints
    /// return a bare string.
    pub fn server_message(body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(msg) = value.as_str() {
                return msg.to_string();
            }
        }
        Self::truncate_body(body.trim())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::server_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            400..=499 => ApiError::Rejected(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "bad id"),
            ApiError::Rejected(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            ApiError::server_message(r#"{"message": "wrong password"}"#),
            "wrong password"
        );
        assert_eq!(ApiError::server_message(r#""plain refusal""#), "plain refusal");
        assert_eq!(ApiError::server_message("not json at all"), "not json at all");

        // Bodies without a message field fall back to the raw (truncated) body
        let msg = ApiError::server_message(r#"{"code": 17}"#);
        assert!(msg.contains("17"));
    }

}
