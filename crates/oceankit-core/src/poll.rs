//! Wait-for-state poll loop
//!
//! After a create, update or destroy, callers block here until the
//! resource settles into the target status. Each iteration re-fetches the
//! resource, then sleeps with capped exponential backoff, bounded by an
//! overall budget.
//!
//! Retry here is scoped to state convergence only. A transport failure
//! during polling propagates immediately rather than being absorbed into
//! the backoff, so persistent outages are never masked.
//!
//! Every sleep and fetch is an await point; dropping the returned future
//! aborts the wait without running out the budget.

use crate::error::{Error, Result};
use crate::traits::Resource;
use crate::transport::ApiClient;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Log a progress line every this many polls, not on every iteration
const LOG_EVERY: u32 = 5;

/// Capped exponential backoff between poll iterations
///
/// Successive delays double from `initial` up to `cap`, so the sequence is
/// monotonically non-decreasing and bounded.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub initial: Duration,
    pub cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(3),
            cap: Duration::from_secs(30),
        }
    }
}

impl Backoff {
    /// First delay of a wait
    pub fn first_delay(&self) -> Duration {
        self.initial.min(self.cap)
    }

    /// `min(current * 2, cap)`
    pub fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.cap)
    }
}

/// Poll until the resource reports the target status
///
/// Returns the fresh snapshot that first reported the target. When the
/// budget elapses first, fails with [`Error::WaitTimeout`] carrying the
/// configured budget; a zero budget performs exactly one fetch and never
/// sleeps. A 404 here means the resource vanished while it was expected to
/// exist and surfaces as [`Error::NotFound`].
pub async fn wait_for<R: Resource>(
    client: &ApiClient,
    id: &R::Id,
    target: R::Status,
    budget: Duration,
) -> Result<R> {
    wait_for_with(client, id, target, budget, Backoff::default()).await
}

/// [`wait_for`] with a caller-supplied backoff policy
pub async fn wait_for_with<R: Resource>(
    client: &ApiClient,
    id: &R::Id,
    target: R::Status,
    budget: Duration,
    backoff: Backoff,
) -> Result<R> {
    let started = Instant::now();
    let mut delay = backoff.first_delay();
    let mut polls: u32 = 0;
    loop {
        let snapshot = R::fetch(client, id).await?;
        polls += 1;
        if snapshot.status() == target {
            debug!(kind = R::kind(), %id, polls, "target status reached");
            return Ok(snapshot);
        }
        if started.elapsed() >= budget {
            return Err(Error::WaitTimeout { budget });
        }
        if polls % LOG_EVERY == 0 {
            info!(
                kind = R::kind(),
                %id,
                status = ?snapshot.status(),
                target = ?target,
                polls,
                "still waiting for target status"
            );
        }
        tokio::time::sleep(delay).await;
        delay = backoff.next_delay(delay);
    }
}

/// Poll until the resource is gone
///
/// The mirror image of [`wait_for`]: a 404 is the target. An immediately
/// absent resource returns at once without sleeping. This is the single
/// place in the library where a not-found answer is swallowed, because
/// not-found is precisely what a completed destroy looks like.
pub async fn wait_until_gone<R: Resource>(
    client: &ApiClient,
    id: &R::Id,
    budget: Duration,
) -> Result<()> {
    wait_until_gone_with::<R>(client, id, budget, Backoff::default()).await
}

/// [`wait_until_gone`] with a caller-supplied backoff policy
pub async fn wait_until_gone_with<R: Resource>(
    client: &ApiClient,
    id: &R::Id,
    budget: Duration,
    backoff: Backoff,
) -> Result<()> {
    let started = Instant::now();
    let mut delay = backoff.first_delay();
    let mut polls: u32 = 0;
    loop {
        match R::fetch(client, id).await {
            Err(Error::NotFound(_)) => {
                debug!(kind = R::kind(), %id, polls, "resource is gone");
                return Ok(());
            }
            Err(e) => return Err(e),
            Ok(snapshot) => {
                polls += 1;
                if started.elapsed() >= budget {
                    return Err(Error::WaitTimeout { budget });
                }
                if polls % LOG_EVERY == 0 {
                    info!(
                        kind = R::kind(),
                        %id,
                        status = ?snapshot.status(),
                        polls,
                        "still waiting for deletion"
                    );
                }
                tokio::time::sleep(delay).await;
                delay = backoff.next_delay(delay);
            }
        }
    }
}
