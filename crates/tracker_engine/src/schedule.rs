//! Cancellable timers on the tokio runtime.
//!
//! Every scheduled task is tied to a [`CancelHandle`]; cancelling or dropping
//! the handle stops the task before its next run.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Owner of a scheduled task. Dropping it cancels the task.
#[derive(Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Read-only view handed to the task itself.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            token: self.token.clone(),
        }
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Runs `task` now and then every `interval` until cancelled.
///
/// Runs never overlap: the next tick is only awaited once the previous run
/// has finished, and a run already in progress is not interrupted.
pub fn schedule_every<F, Fut>(interval: Duration, mut task: F) -> CancelHandle
where
    F: FnMut(CancelSignal) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = CancelHandle {
        token: CancellationToken::new(),
    };
    let signal = handle.signal();
    let period = interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                () = signal.token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            task(signal.clone()).await;
        }
    });

    handle
}

/// Runs `task` once after `delay` unless cancelled first.
pub fn schedule_once<F, Fut>(delay: Duration, task: F) -> CancelHandle
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = CancelHandle {
        token: CancellationToken::new(),
    };
    let signal = handle.signal();

    tokio::spawn(async move {
        tokio::select! {
            biased;
            () = signal.token.cancelled() => {}
            () = time::sleep(delay) => task().await,
        }
    });

    handle
}
