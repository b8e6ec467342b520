//! Synthetic input: the reverse direction of the bridge.
//!
//! Replays [`InputEvent`]s as if a real keyboard or mouse produced them.
//! The platform-specific implementation lives in the infrastructure layer;
//! this module only defines the contract and the helpers built on it.

use keybridge_core::{Action, InputEvent};
use thiserror::Error;

/// Error type for input emulation operations.
#[derive(Debug, Error)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("cannot send an event with action {0:?}")]
    InvalidAction(Action),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Platform-agnostic input injection.
pub trait InputSender: Send + Sync {
    /// Injects one key or mouse-button event into the system input stream.
    fn send(&self, event: InputEvent) -> Result<(), EmulationError>;
}

/// Sends `events` in order, stopping at the first failure.
///
/// Returns the number of events sent before the failure, if any.
pub fn send_all(
    sender: &dyn InputSender,
    events: &[InputEvent],
) -> Result<usize, (usize, EmulationError)> {
    for (sent, event) in events.iter().enumerate() {
        sender.send(*event).map_err(|e| (sent, e))?;
    }
    Ok(events.len())
}

/// Rejects events that do not describe a transition.
pub fn validate(event: InputEvent) -> Result<InputEvent, EmulationError> {
    if event.action == Action::None {
        return Err(EmulationError::InvalidAction(event.action));
    }
    Ok(event)
}
