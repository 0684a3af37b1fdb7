use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    constants::CLOCK_TICK,
    errors::{AppError, AppResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Expired,
}

/// Countdown for one session. The tick task is owned by the clock and is
/// aborted on cancel or drop, so a finalized session never hears from it.
pub struct SessionClock {
    budget: Duration,
    state: ClockState,
    expires_at: Option<Instant>,
    remaining: Arc<watch::Sender<u64>>,
    task: Option<JoinHandle<()>>,
}

impl SessionClock {
    pub fn new(budget: Duration) -> Self {
        let (remaining, _) = watch::channel(budget.as_secs());
        Self {
            budget,
            state: ClockState::Idle,
            expires_at: None,
            remaining: Arc::new(remaining),
            task: None,
        }
    }

    /// Starts ticking. The returned receiver resolves once, when the budget
    /// measured from this call is used up. A zero budget resolves immediately.
    pub fn start(&mut self) -> AppResult<oneshot::Receiver<()>> {
        if self.state != ClockState::Idle {
            return Err(AppError::InternalError(
                "Session clock cannot be restarted".to_string(),
            ));
        }

        let (deadline_tx, deadline_rx) = oneshot::channel();
        let remaining = Arc::clone(&self.remaining);
        let started = Instant::now();
        let expires_at = started + self.budget;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(started + CLOCK_TICK, CLOCK_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let expiry = time::sleep_until(expires_at);
            tokio::pin!(expiry);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut expiry => break,
                    _ = ticker.tick() => {
                        let left = expires_at.saturating_duration_since(Instant::now());
                        remaining.send_replace(left.as_secs());
                    }
                }
            }
            remaining.send_replace(0);
            let _ = deadline_tx.send(());
        }));
        self.expires_at = Some(expires_at);
        self.state = ClockState::Running;

        Ok(deadline_rx)
    }

    /// Stops the tick source. The deadline signal will not fire afterwards.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.state = ClockState::Expired;
    }

    /// Instant the budget runs out, once started.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    pub fn state(&self) -> ClockState {
        match (&self.state, &self.task) {
            (ClockState::Running, Some(task)) if task.is_finished() => ClockState::Expired,
            (state, _) => *state,
        }
    }

    /// Whole seconds left in the budget.
    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    pub fn subscribe_remaining(&self) -> watch::Receiver<u64> {
        self.remaining.subscribe()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
