use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::browser::PageDriver;
use crate::error::ScrapeError;

/// Result of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready(Duration),
    TimedOut(Duration),
}

/// Polls `predicate` until it returns `true` or `timeout` elapses.
///
/// The predicate is checked at least once. Errors from the predicate count as "not yet",
/// since pages commonly reject scripts while they are still navigating.
pub async fn wait_until<F>(timeout: Duration, poll: Duration, mut predicate: F) -> WaitOutcome
where
    F: FnMut() -> Result<bool, ScrapeError>,
{
    let start = Instant::now();
    loop {
        match predicate() {
            Ok(true) => return WaitOutcome::Ready(start.elapsed()),
            Ok(false) => {}
            Err(e) => debug!(error = %e, "wait predicate failed, polling again"),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return WaitOutcome::TimedOut(elapsed);
        }
        sleep(poll.min(timeout - elapsed)).await;
    }
}

/// Blocks until `selector` is present in the page, or fails with `WaitTimeout`.
pub async fn wait_for_selector<D: PageDriver + ?Sized>(
    driver: &D,
    selector: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<Duration, ScrapeError> {
    match wait_until(timeout, poll, || driver.has_element(selector)).await {
        WaitOutcome::Ready(elapsed) => Ok(elapsed),
        WaitOutcome::TimedOut(elapsed) => {
            debug!(selector, ?elapsed, "selector never appeared");
            Err(ScrapeError::WaitTimeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }
}
