#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;

/// Periodic "still working" messages bound to one outstanding request.
///
/// The task is cancelled by [`StatusTicker::stop`] or, failing that, when
/// the ticker is dropped, so it cannot outlive the request that owns it.
pub struct StatusTicker {
    /// Cancels the background task.
    token:  CancellationToken,
    /// Background task, taken by `stop`.
    handle: Option<JoinHandle<()>>,
}

impl StatusTicker {
    /// Starts cycling through `messages`, one every `period`.
    ///
    /// The first message is emitted after one full period. An empty message
    /// list starts nothing.
    pub fn spawn<F>(messages: Vec<String>, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        let token = CancellationToken::new();
        if messages.is_empty() {
            token.cancel();
            return Self {
                token,
                handle: None,
            };
        }

        let cancelled = token.child_token();
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for message in messages.iter().cycle() {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticks.tick() => on_tick(message),
                }
            }
            tracing::trace!("Status ticker stopped");
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Token that reports whether the ticker has been cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the ticker has been told to stop.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels the ticker and waits for its task to finish.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::debug!("Status ticker task ended abnormally: {e}");
        }
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
