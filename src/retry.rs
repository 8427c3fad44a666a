//! Bounded retry with linear backoff
//!
//! One attempt is a self-contained unit of work (generate + persist), so an
//! abandoned retry never leaves partial state behind.

use crate::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_step: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt once `failed_attempts` attempts have failed.
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        self.backoff_step * failed_attempts
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`; an `Err` means the wait was interrupted.
    async fn sleep(&self, duration: Duration) -> Result<()>;
}

/// Real-time sleeper that wakes early when shutdown is signalled.
#[derive(Clone, Default)]
pub struct TokioSleeper {
    shutdown: Option<watch::Receiver<bool>>,
}

impl TokioSleeper {
    pub fn new() -> Self {
        Self { shutdown: None }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }
}

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + duration;

        let Some(shutdown) = &self.shutdown else {
            tokio::time::sleep_until(deadline).await;
            return Ok(());
        };

        let mut shutdown = shutdown.clone();
        // Resolves to false if the sender is gone; that branch is then disabled.
        let stop_requested = async move { shutdown.wait_for(|stop| *stop).await.is_ok() };

        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => Ok(()),
            true = stop_requested => Err(Error::Interrupted(
                "shutdown requested during retry backoff".to_string(),
            )),
        }
    }
}

/// Sleeper double that records requested delays and returns immediately.
#[derive(Clone, Default)]
pub struct MockSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
    interrupt_after: Option<usize>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `count` sleeps complete, then report every further one as interrupted.
    pub fn interrupt_after(mut self, count: usize) -> Self {
        self.interrupt_after = Some(count);
        self
    }

    pub fn get_delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for MockSleeper {
    async fn sleep(&self, duration: Duration) -> Result<()> {
        let mut delays = self.delays.lock().unwrap();
        if self.interrupt_after.is_some_and(|limit| delays.len() >= limit) {
            return Err(Error::Interrupted("mock interruption".to_string()));
        }
        delays.push(duration);
        Ok(())
    }
}

/// Run `attempt` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// `attempt` receives the 1-based attempt number. After failed attempt `k`
/// the wrapper sleeps `k * backoff_step`; no sleep follows the final failure.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut failures: u32 = 0;

    loop {
        match attempt(failures + 1).await {
            Ok(value) => {
                if failures > 0 {
                    info!("[{}] Succeeded after {} failed attempts", label, failures);
                }
                return Ok(value);
            }
            Err(e) => {
                failures += 1;

                if failures >= policy.max_attempts {
                    error!(
                        "[{}] Attempt {}/{} failed: {}. Giving up",
                        label, failures, policy.max_attempts, e
                    );
                    return Err(Error::RetryExhausted {
                        attempts: failures,
                        last: Box::new(e),
                    });
                }

                let delay = policy.delay_for(failures);
                warn!(
                    "[{}] Attempt {}/{} failed: {}. Retrying in {}s",
                    label,
                    failures,
                    policy.max_attempts,
                    e,
                    delay.as_secs()
                );

                if let Err(interrupted) = sleeper.sleep(delay).await {
                    warn!("[{}] Retry abandoned: {}", label, interrupted);
                    return Err(interrupted);
                }
            }
        }
    }
}
