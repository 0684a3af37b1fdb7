pub mod backend;
pub mod clock;
pub mod controller;
pub mod integrity;

pub use backend::{AttemptBackend, LocalAttemptBackend};
pub use clock::{ClockState, SessionClock};
pub use controller::{
    AttemptCommand, AttemptController, AttemptEvent, AttemptHandle, AttemptOutcome,
    AttemptSession, FinalizeTrigger,
};
pub use integrity::{EnvironmentEvent, IntegrityMonitor, IntegritySignal, RestrictedAction};
