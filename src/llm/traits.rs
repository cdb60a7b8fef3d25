use async_trait::async_trait;
use thiserror::Error;

/// Failure classes for a single upstream text-generation call.
///
/// Only `Overloaded` is transient enough to retry; everything else
/// propagates immediately (rate limits included, by observed policy).
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model overloaded: {0}")]
    Overloaded(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("upstream call failed: {0}")]
    Unknown(String),
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Overloaded(_))
    }

    /// Classify an HTTP-style failure by status code, falling back to a
    /// message-substring check for proxies that mislabel overload as 500.
    pub fn classify(status: u16, body: &str) -> Self {
        match status {
            503 => LlmError::Overloaded(body.to_string()),
            429 => LlmError::RateLimited(body.to_string()),
            401 | 403 => LlmError::Auth(body.to_string()),
            500..=599 if body.to_ascii_lowercase().contains("overloaded") => {
                LlmError::Overloaded(body.to_string())
            }
            _ => LlmError::Unknown(format!("status {}: {}", status, body)),
        }
    }
}

impl From<LlmError> for crate::error::IdealensError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Overloaded(message) => crate::error::IdealensError::Overloaded { message },
            LlmError::RateLimited(message) => crate::error::IdealensError::RateLimited { message },
            LlmError::Auth(message) => crate::error::IdealensError::Auth { message },
            LlmError::Unknown(message) => crate::error::IdealensError::Internal { message },
        }
    }
}

/// One upstream text-generation call. Implementations must be cheap to share
/// behind an `Arc` across request tasks.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        assert!(matches!(LlmError::classify(503, ""), LlmError::Overloaded(_)));
        assert!(matches!(LlmError::classify(429, ""), LlmError::RateLimited(_)));
        assert!(matches!(LlmError::classify(401, ""), LlmError::Auth(_)));
        assert!(matches!(LlmError::classify(403, ""), LlmError::Auth(_)));
        assert!(matches!(LlmError::classify(400, ""), LlmError::Unknown(_)));
    }

    #[test]
    fn overload_substring_upgrades_500() {
        let err = LlmError::classify(500, "The model is overloaded. Please try again later.");
        assert!(err.is_retryable());
    }

    #[test]
    fn only_overloaded_is_retryable() {
        assert!(LlmError::Overloaded(String::new()).is_retryable());
        assert!(!LlmError::RateLimited(String::new()).is_retryable());
        assert!(!LlmError::Auth(String::new()).is_retryable());
        assert!(!LlmError::Unknown(String::new()).is_retryable());
    }
}
