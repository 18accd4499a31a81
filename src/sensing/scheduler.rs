use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// One unit of periodic work. Ticks never overlap: the next one starts only
/// after the previous `tick` has returned and the interval has elapsed.
#[async_trait]
pub trait PollAction: Send + 'static {
    async fn tick(&mut self);
}

/// Invokes `action` immediately, then again `interval` after each tick
/// returns, until `cancel_token` fires. Cancellation is only observed between
/// ticks; a tick in progress always runs to completion. The action is handed
/// back so a later run can continue with its state.
pub async fn repeat_every<A: PollAction>(
    mut action: A,
    interval: Duration,
    cancel_token: CancellationToken,
) -> A {
    while !cancel_token.is_cancelled() {
        action.tick().await;

        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    log_info!("poll loop shutting down");
    action
}

/// Runs a [`PollAction`] on a fixed interval in a background task. Each
/// `start` gets a fresh cancellation token and ticks right away.
pub struct PollScheduler<A: PollAction> {
    interval: Duration,
    idle: Option<A>,
    handle: Option<JoinHandle<A>>,
    cancel_token: Option<CancellationToken>,
}

impl<A: PollAction> PollScheduler<A> {
    pub fn new(action: A, interval: Duration) -> Self {
        Self {
            interval,
            idle: Some(action),
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns `false` when already running.
    pub fn start(&mut self) -> Result<bool> {
        if self.handle.is_some() {
            return Ok(false);
        }

        let action = self
            .idle
            .take()
            .ok_or_else(|| anyhow!("poll action was lost when its last run failed"))?;

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(repeat_every(action, self.interval, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        log_info!("polling every {}s", self.interval.as_secs_f32());
        Ok(true)
    }

    /// Requests cancellation and waits for the loop to hand back its action.
    /// Returns `false` when nothing was running.
    pub async fn stop(&mut self) -> Result<bool> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        let Some(handle) = self.handle.take() else {
            return Ok(false);
        };

        let action = handle.await.context("poll loop task failed to join")?;
        self.idle = Some(action);
        Ok(true)
    }
}
