//! Task poller
//!
//! A submitted task moves from `Pending` to one of two terminal states:
//! `Ready` when a status check returns a non-empty `result`, or `TimedOut` when
//! the whole-second elapsed time reaches the budget. The poll loop is the only
//! place that decides completion.
//!
//! On every non-ready iteration the loop reports progress to an optional
//! [`ProgressObserver`] *before* checking the deadline, so the final
//! over-budget tick is still delivered. Observers run synchronously on the
//! polling task between status checks; time they spend is real time that
//! counts against the budget.

use crate::error::{Error, Result};
use crate::transport::TaskApi;
use crate::types::TaskPayload;
use std::time::{Duration, Instant};

/// Receives progress reports from the poll loop
///
/// Observers are shared with the polling future, which may move between
/// runtime worker threads, so they must be `Send + Sync`. Implemented for
/// every such `Fn(u64, u64)`, so a closure is enough:
///
/// ```
/// use shopping_serp::poller::ProgressObserver;
///
/// let observer = |elapsed: u64, max: u64| println!("{elapsed}/{max}s");
/// observer.on_tick(3, 180);
/// ```
pub trait ProgressObserver: Send + Sync {
    /// Called once per pending status check with whole-second elapsed time
    /// and the budget
    fn on_tick(&self, elapsed_secs: u64, max_wait_secs: u64);
}

impl<F> ProgressObserver for F
where
    F: Fn(u64, u64) + Send + Sync,
{
    fn on_tick(&self, elapsed_secs: u64, max_wait_secs: u64) {
        self(elapsed_secs, max_wait_secs)
    }
}

/// State of a poll sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    /// No result yet, deadline not reached
    Pending,
    /// Result available (terminal)
    Ready,
    /// Deadline reached without a result (terminal)
    TimedOut,
}

impl PollState {
    /// Decide the state after one status check
    ///
    /// Readiness wins over the deadline: a result that arrives on an
    /// over-budget check is still returned.
    pub fn after_check(ready: bool, elapsed_secs: u64, max_wait_secs: u64) -> Self {
        if ready {
            PollState::Ready
        } else if elapsed_secs >= max_wait_secs {
            PollState::TimedOut
        } else {
            PollState::Pending
        }
    }
}

/// Poll `get_path` until the task is ready or `max_wait` elapses
///
/// Each status check goes through [`TaskApi::get`], so transient failures are
/// retried under the transport's polling policy; an error that survives those
/// retries ends the poll and is returned unchanged. On success the full
/// response is returned verbatim.
pub async fn poll_until_ready<A>(
    api: &A,
    get_path: &str,
    max_wait: Duration,
    interval: Duration,
    observer: Option<&dyn ProgressObserver>,
) -> Result<TaskPayload>
where
    A: TaskApi + ?Sized,
{
    let max_wait_secs = max_wait.as_secs();
    let start = Instant::now();
    let mut checks: u32 = 0;

    loop {
        let payload = api.get(get_path).await?;
        checks += 1;

        let elapsed_secs = start.elapsed().as_secs();
        let state = PollState::after_check(payload.is_ready(), elapsed_secs, max_wait_secs);

        if state == PollState::Ready {
            tracing::debug!(
                path = get_path,
                checks,
                elapsed_ms = start.elapsed().as_millis(),
                "Task ready"
            );
            return Ok(payload);
        }

        tracing::debug!(
            path = get_path,
            checks,
            elapsed_secs,
            max_wait_secs,
            task_status = ?payload.task_status_code(),
            task_message = ?payload.first_task().and_then(|t| t.get("status_message")),
            "Task pending"
        );

        if let Some(observer) = observer {
            observer.on_tick(elapsed_secs, max_wait_secs);
        }

        if state == PollState::TimedOut {
            tracing::warn!(path = get_path, checks, max_wait_secs, "Task timed out");
            return Err(Error::Timeout { max_wait_secs });
        }

        tokio::time::sleep(interval).await;
    }
}
