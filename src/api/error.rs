use thiserror::Error;

/// Failure classes for calls against the hosted relational store.
///
/// The backend authenticates with a single API key, so 401 and 403
/// collapse into one rejected-key case; there is no per-user
/// permission surface to distinguish.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("API key rejected: {0}")]
    Unauthorized(String),

    #[error("Table or row not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies carried in messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl RemoteError {
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

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 | 403 => RemoteError::Unauthorized(truncated),
            404 => RemoteError::NotFound(truncated),
            429 => RemoteError::RateLimited,
            500..=599 => RemoteError::ServerError(truncated),
            _ => RemoteError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_common_codes() {
        assert!(matches!(
            RemoteError::from_status(reqwest::StatusCode::UNAUTHORIZED, ""),
            RemoteError::Unauthorized(_)
        ));
        // A key without grants reads the same as a bad key
        assert!(matches!(
            RemoteError::from_status(reqwest::StatusCode::FORBIDDEN, "permission denied"),
            RemoteError::Unauthorized(body) if body == "permission denied"
        ));
        assert!(matches!(
            RemoteError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            RemoteError::RateLimited
        ));
        assert!(matches!(
            RemoteError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            RemoteError::ServerError(body) if body == "boom"
        ));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let err = RemoteError::from_status(reqwest::StatusCode::BAD_GATEWAY, &body);
        let msg = err.to_string();
        assert!(msg.contains("truncated, 2000 total bytes"));
        assert!(msg.len() < 700);
    }
}
