use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{scripts, PageDriver};
use crate::config::PaginationConfig;
use crate::error::ScrapeError;

/// Why scrolling stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Two consecutive height readings matched.
    Stabilized,
    /// `max_rounds` reached while the page was still growing.
    RoundLimit,
    /// The scroll or height script failed; whatever loaded so far is kept.
    ScriptFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scrolling,
    Done(StopReason),
}

/// Pagination cursor; only lives for the duration of one scroll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub last_height: i64,
    pub rounds: usize,
}

impl ScrollState {
    pub fn new(initial_height: i64) -> Self {
        Self { last_height: initial_height, rounds: 0 }
    }

    /// Feeds the height read after one scroll round.
    pub fn advance(&mut self, new_height: i64, max_rounds: usize) -> Phase {
        self.rounds += 1;
        if new_height == self.last_height {
            return Phase::Done(StopReason::Stabilized);
        }
        self.last_height = new_height;
        if self.rounds >= max_rounds {
            Phase::Done(StopReason::RoundLimit)
        } else {
            Phase::Scrolling
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSummary {
    pub rounds: usize,
    pub final_height: i64,
    pub reason: StopReason,
}

fn read_height<D: PageDriver + ?Sized>(driver: &D) -> Result<i64, ScrapeError> {
    let value = driver.evaluate(scripts::DOCUMENT_HEIGHT)?;
    value
        .as_f64()
        .map(|h| h as i64)
        .ok_or_else(|| ScrapeError::Script(format!("document height was not a number: {value}")))
}

/// Scrolls to the bottom until the document stops growing or `max_rounds` is hit.
pub async fn scroll_until_stable<D: PageDriver + ?Sized>(
    driver: &D,
    config: &PaginationConfig,
) -> ScrollSummary {
    let mut state = match read_height(driver) {
        Ok(height) => ScrollState::new(height),
        Err(e) => {
            warn!(error = %e, "could not read initial page height, skipping pagination");
            return ScrollSummary { rounds: 0, final_height: 0, reason: StopReason::ScriptFailed };
        }
    };

    let finish = |state: &ScrollState, reason| ScrollSummary {
        rounds: state.rounds,
        final_height: state.last_height,
        reason,
    };

    if config.max_rounds == 0 {
        return finish(&state, StopReason::RoundLimit);
    }

    let reason = loop {
        if let Err(e) = driver.evaluate(scripts::SCROLL_TO_BOTTOM) {
            warn!(round = state.rounds + 1, error = %e, "scroll script failed");
            break StopReason::ScriptFailed;
        }
        sleep(config.settle_delay).await;

        let height = match read_height(driver) {
            Ok(height) => height,
            Err(e) => {
                warn!(round = state.rounds + 1, error = %e, "height read failed");
                break StopReason::ScriptFailed;
            }
        };
        debug!(round = state.rounds + 1, height, "scrolled");

        match state.advance(height, config.max_rounds) {
            Phase::Scrolling => continue,
            Phase::Done(reason) => break reason,
        }
    };

    let summary = finish(&state, reason);
    match reason {
        StopReason::RoundLimit => warn!(
            rounds = summary.rounds,
            "page still growing after the scroll round limit, stopping"
        ),
        _ => info!(rounds = summary.rounds, height = summary.final_height, ?reason, "pagination done"),
    }
    summary
}
