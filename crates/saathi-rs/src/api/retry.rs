//! Automatic retry with exponential backoff and jitter.
//!
//! Retries transient transport failures (HTTP 429, 500, 502, 503, 504 and
//! network-level errors). Client errors, service error objects and schema
//! failures are returned on the first attempt. The default configuration
//! performs no retries, so one call is exactly one request.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::TransportError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries (0 = fail on the first error).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Backoff multiplier (2.0 doubles the delay each attempt).
    pub multiplier: f64,
    /// Scale delays down by a per-attempt factor to spread out retries.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Default backoff with the given number of retries.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter {
            // Deterministic jitter; no rand dependency for this.
            let factor = match attempt % 4 {
                0 => 0.75,
                1 => 0.90,
                2 => 0.60,
                _ => 0.85,
            };
            Duration::from_secs_f64(capped * factor)
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

/// Whether a transport failure is worth retrying.
pub fn is_transient(error: &TransportError) -> bool {
    match error {
        TransportError::Request(_) => true,
        TransportError::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
        TransportError::Decode(_) | TransportError::Service(_) | TransportError::EmptyReply => {
            false
        }
    }
}

/// Run `call`, retrying transient failures according to `config`.
pub async fn retry_transient<T, F, Fut>(config: &RetryConfig, mut call: F) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < config.max_retries && is_transient(&e) => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    "Transient transport error (attempt {}/{}): {e}. Retrying in {delay:?}...",
                    attempt + 1,
                    config.max_retries,
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn default_config_no_retries() {
        assert_eq!(RetryConfig::default().max_retries, 0);
    }

    #[test]
    fn delay_increases_exponentially() {
        let config = RetryConfig {
            jitter: false,
            ..RetryConfig::with_retries(5)
        };
        let d0 = config.delay_for_attempt(0);
        let d1 = config.delay_for_attempt(1);
        let d2 = config.delay_for_attempt(2);
        assert!(d1 > d0, "d1={d1:?} should be > d0={d0:?}");
        assert!(d2 > d1, "d2={d2:?} should be > d1={d1:?}");
    }

    #[test]
    fn delay_capped_at_max() {
        let config = RetryConfig {
            jitter: false,
            max_delay: Duration::from_secs(2),
            ..RetryConfig::with_retries(10)
        };
        assert!(config.delay_for_attempt(10) <= Duration::from_secs(2));
    }

    #[test]
    fn jitter_never_lengthens_delay() {
        let jittered = RetryConfig::with_retries(3);
        let plain = RetryConfig {
            jitter: false,
            ..RetryConfig::with_retries(3)
        };
        for attempt in 0..4 {
            assert!(jittered.delay_for_attempt(attempt) <= plain.delay_for_attempt(attempt));
        }
    }

    #[test]
    fn transient_classification() {
        assert!(is_transient(&TransportError::Request("timed out".into())));
        assert!(is_transient(&TransportError::Status {
            status: 429,
            body: "rate limited".into()
        }));
        assert!(is_transient(&TransportError::Status {
            status: 503,
            body: String::new()
        }));
        assert!(!is_transient(&TransportError::Status {
            status: 401,
            body: "unauthorized".into()
        }));
        assert!(!is_transient(&TransportError::Status {
            status: 400,
            body: String::new()
        }));
        assert!(!is_transient(&TransportError::EmptyReply));
        assert!(!is_transient(&TransportError::Service("bad model".into())));
    }

    fn fast(retries: u32) -> RetryConfig {
        RetryConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            ..RetryConfig::with_retries(retries)
        }
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(&fast(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TransportError::Status {
                        status: 502,
                        body: "bad gateway".into(),
                    })
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transient(&fast(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(TransportError::Status {
                    status: 400,
                    body: "bad request".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transient(&fast(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TransportError::Request("connection reset".into())) }
        })
        .await;
        assert_eq!(
            result,
            Err(TransportError::Request("connection reset".into()))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
