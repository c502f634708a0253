use std::future::Future;
use std::time::Duration;

use crate::error::BackendError;

const BASE_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 10_000;

/// Delay before retrying after `attempt` (1-based) failed:
/// `min(1000 * 2^(attempt-1), 10000)` ms.
pub fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let ms = BASE_DELAY_MS.saturating_mul(1u64 << exp).min(MAX_DELAY_MS);
    Duration::from_millis(ms)
}

/// Run `init` until it succeeds, sleeping with exponential backoff between
/// attempts. Gives up with [`BackendError::InitFailed`] after `max_attempts`.
pub async fn connect_with_retry<T, F, Fut>(max_attempts: u32, mut init: F) -> Result<T, BackendError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match init(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::error!("Backend initialization attempt {} failed: {}", attempt, e);
                if attempt < max_attempts {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
            }
        }
    }

    Err(BackendError::InitFailed {
        attempts: max_attempts,
    })
}
