// File: ./src/client/error.rs
use http::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failure of one backend call. The `Display` text is what gets shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("{message}")]
    Unauthorized { message: String },
    #[error("{message}")]
    Forbidden { message: String },
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds the error for a non-success response, preferring the server's
    /// own `message` (a string, or a list of validation messages).
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = server_message(body).unwrap_or_else(|| default_message(status));
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
            StatusCode::FORBIDDEN => ApiError::Forbidden { message },
            StatusCode::NOT_FOUND => ApiError::NotFound { message },
            _ => ApiError::Status { status, message },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

fn default_message(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "Unauthorized".to_string(),
        StatusCode::FORBIDDEN => "Access forbidden".to_string(),
        StatusCode::NOT_FOUND => "Resource not found".to_string(),
        s if s.is_server_error() => "Server error".to_string(),
        s => format!("Request failed with status code {}", s.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_preferred() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            br#"{"message":"Event is not ongoing","statusCode":400}"#,
        );
        assert_eq!(err.to_string(), "Event is not ongoing");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_validation_list_is_joined() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            br#"{"message":["name should not be empty","endDate must be a date"]}"#,
        );
        assert_eq!(
            err.to_string(),
            "name should not be empty; endDate must be a date"
        );
    }

    #[test]
    fn test_fallback_messages_by_status() {
        assert!(ApiError::from_response(StatusCode::UNAUTHORIZED, b"").is_unauthorized());
        assert_eq!(
            ApiError::from_response(StatusCode::BAD_GATEWAY, b"<html>").to_string(),
            "Server error"
        );
        assert_eq!(
            ApiError::from_response(StatusCode::CONFLICT, b"{}").to_string(),
            "Request failed with status code 409"
        );
    }
}
