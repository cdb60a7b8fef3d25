//! Bounded exponential backoff around a single upstream call.
//!
//! Only the `Overloaded` class is retried; rate limits and auth failures
//! propagate immediately. The final attempt's failure always surfaces, which
//! bounds worst-case latency per section to `base * (2^attempts - 1)` plus
//! the call durations themselves.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::llm::LlmError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            // Zero attempts would swallow the operation entirely.
            attempts: attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// Backoff before retry number `attempt` (0-based): `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Run `op` under the policy. `op` is called once per attempt.
pub async fn call_with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt + 1 < policy.attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "model overloaded, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
