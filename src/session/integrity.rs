use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Signals the host environment reports while a session is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "action", rename_all = "snake_case")]
pub enum EnvironmentEvent {
    /// The session's viewport was hidden or backgrounded.
    VisibilityLost,
    RestrictedAction(RestrictedAction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictedAction {
    DeveloperTools,
    ContextMenu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegritySignal {
    Warning { violations: u32, limit: u32 },
    RestrictedActionBlocked(RestrictedAction),
    ForceSubmit { violations: u32 },
}

/// Counts visibility losses and escalates to a forced submit at `limit`.
///
/// The monitor owns the environment subscription. Detaching closes it, and
/// a detached monitor ignores everything it is shown.
pub struct IntegrityMonitor {
    events: Option<mpsc::UnboundedReceiver<EnvironmentEvent>>,
    violations: u32,
    limit: u32,
}

impl IntegrityMonitor {
    pub fn attach(events: mpsc::UnboundedReceiver<EnvironmentEvent>, limit: u32) -> Self {
        Self {
            events: Some(events),
            violations: 0,
            limit: limit.max(1),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.events.is_some()
    }

    pub fn violations(&self) -> u32 {
        self.violations
    }

    pub fn observe(&mut self, event: EnvironmentEvent) -> Option<IntegritySignal> {
        if !self.is_attached() {
            return None;
        }

        match event {
            EnvironmentEvent::RestrictedAction(action) => {
                Some(IntegritySignal::RestrictedActionBlocked(action))
            }
            EnvironmentEvent::VisibilityLost => {
                self.violations += 1;
                if self.violations >= self.limit {
                    log::warn!(
                        "Visibility lost {} times, forcing submission",
                        self.violations
                    );
                    self.detach();
                    Some(IntegritySignal::ForceSubmit {
                        violations: self.violations,
                    })
                } else {
                    Some(IntegritySignal::Warning {
                        violations: self.violations,
                        limit: self.limit,
                    })
                }
            }
        }
    }

    /// Waits for the next event that produces a signal. Returns `None` once
    /// the monitor is detached or the environment stops sending.
    pub async fn next_signal(&mut self) -> Option<IntegritySignal> {
        loop {
            let events = self.events.as_mut()?;
            let Some(event) = events.recv().await else {
                self.events = None;
                return None;
            };
            if let Some(signal) = self.observe(event) {
                return Some(signal);
            }
        }
    }

    pub fn detach(&mut self) {
        if let Some(mut events) = self.events.take() {
            events.close();
        }
    }
}

impl Drop for IntegrityMonitor {
    fn drop(&mut self) {
        self.detach();
    }
}
