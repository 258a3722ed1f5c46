//! Bounded retries with a fixed pause between attempts.
//!
//! ```no_run
//! use food_tracker_api::resilience::retry::{retry, ConstantBackoff};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = ConstantBackoff::new(3, Duration::from_secs(3));
//!
//! let result = retry(&policy, || async {
//!     Ok::<_, std::io::Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Trait for retry policies
pub trait RetryPolicy: Send + Sync {
    /// Delay before the next attempt, given how many attempts have been made.
    ///
    /// Returns `None` once the attempt budget is spent.
    fn next_delay(&self, attempts_made: usize) -> Option<Duration>;

    /// Total number of attempts, the first one included
    fn max_attempts(&self) -> usize;
}

/// Fixed delay between attempts, no pause after the last one
#[derive(Debug, Clone)]
pub struct ConstantBackoff {
    max_attempts: usize,
    delay: Duration,
}

impl ConstantBackoff {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for ConstantBackoff {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(3))
    }
}

impl RetryPolicy for ConstantBackoff {
    fn next_delay(&self, attempts_made: usize) -> Option<Duration> {
        if attempts_made >= self.max_attempts {
            None
        } else {
            Some(self.delay)
        }
    }

    fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

/// Error wrapper that includes retry attempt information
#[derive(Debug)]
pub struct RetryError<E> {
    /// Error from the final attempt
    pub error: E,
    /// Number of attempts made
    pub attempts: usize,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Operation failed after {} attempts: {}",
            self.attempts, self.error
        )
    }
}

impl<E: std::error::Error> std::error::Error for RetryError<E> {}

/// Run `f` until it returns `Ok` or the policy runs out of attempts.
///
/// Every `Err` counts as transient. Callers that need a terminal failure to
/// stop the loop return it inside `Ok`.
pub async fn retry<F, Fut, T, E, P>(policy: &P, mut f: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy + ?Sized,
    E: fmt::Display,
{
    let mut attempts = 0;

    loop {
        attempts += 1;
        debug!("Attempt {}/{}", attempts, policy.max_attempts());

        match f().await {
            Ok(result) => {
                if attempts > 1 {
                    debug!("Operation succeeded after {} attempts", attempts);
                }
                return Ok(result);
            }
            Err(e) => match policy.next_delay(attempts) {
                Some(delay) => {
                    debug!(error = %e, "Attempt failed, retrying after {:?}", delay);
                    sleep(delay).await;
                }
                None => {
                    warn!(error = %e, "Max retry attempts reached");
                    return Err(RetryError { error: e, attempts });
                }
            },
        }
    }
}
