use crate::utils::error::{EtlError, Result};
use std::future::Future;

/// Bounded re-execution of a failing step. Attempts run back-to-back; there
/// is no backoff or jitter between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3 }
    }
}

pub async fn retry<T, F, Fut>(policy: RetryPolicy, operation: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<EtlError> = None;

    for attempt in 1..=policy.attempts {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("'{}' succeeded on attempt {}", operation, attempt);
                }
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(
                    "'{}' attempt {}/{} failed: {}",
                    operation,
                    attempt,
                    policy.attempts,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    Err(EtlError::RetryExhaustedError {
        operation: operation.to_string(),
        attempts: policy.attempts,
        message: last_error.map(|e| e.to_string()).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn run_flaky(fail_times: u32, policy: RetryPolicy) -> (Result<u32>, u32) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = retry(policy, "download", move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= fail_times {
                    Err(EtlError::ProcessingError {
                        message: format!("transient failure {}", n),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        let total = calls.load(Ordering::SeqCst);
        (result, total)
    }

    #[tokio::test]
    async fn test_retry_succeeds_first_attempt() {
        let (result, calls) = run_flaky(0, RetryPolicy::new(3)).await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_within_budget() {
        let (result, calls) = run_flaky(2, RetryPolicy::new(3)).await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempts() {
        let (result, calls) = run_flaky(10, RetryPolicy::new(3)).await;
        assert_eq!(calls, 3);
        match result.unwrap_err() {
            EtlError::RetryExhaustedError {
                operation,
                attempts,
                message,
            } => {
                assert_eq!(operation, "download");
                assert_eq!(attempts, 3);
                assert!(message.contains("transient failure 3"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_clamped_to_one() {
        let (result, calls) = run_flaky(0, RetryPolicy::new(0)).await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 1);
    }
}
