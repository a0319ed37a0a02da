use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;

/// Fixed-interval, bounded retry policy for state polling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOutcome<T> {
    /// Last observed value, whether or not it satisfied the predicate.
    pub value: T,
    pub attempts: u32,
    pub satisfied: bool,
}

/// Calls `fetch` until `done` accepts its result or `policy.max_attempts` is
/// reached, sleeping `policy.interval` between attempts.
///
/// Running out of attempts is not an error: the last observed value comes back
/// with `satisfied == false`. Failed fetches use up an attempt, except
/// `AppError::Auth` which is returned straight away.
pub async fn poll_until<T, F, Fut, P>(
    policy: &PollPolicy,
    mut fetch: F,
    done: P,
) -> Result<PollOutcome<T>, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
    P: Fn(&T) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_value: Option<T> = None;
    let mut last_error: Option<AppError> = None;

    for attempt in 1..=max_attempts {
        match fetch().await {
            Ok(value) => {
                if done(&value) {
                    debug!("Poll satisfied after {} attempt(s)", attempt);
                    return Ok(PollOutcome {
                        value,
                        attempts: attempt,
                        satisfied: true,
                    });
                }
                last_value = Some(value);
            }
            Err(AppError::Auth) => return Err(AppError::Auth),
            Err(e) => {
                warn!("Poll attempt {}/{} failed: {}", attempt, max_attempts, e);
                last_error = Some(e);
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    match last_value {
        Some(value) => {
            warn!("Giving up polling after {} attempts", max_attempts);
            Ok(PollOutcome {
                value,
                attempts: max_attempts,
                satisfied: false,
            })
        }
        None => Err(last_error.unwrap_or(AppError::InternalServerError)),
    }
}
