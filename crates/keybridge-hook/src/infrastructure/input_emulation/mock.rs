//! Mock input sender for unit testing.
//!
//! The real sender calls `SendInput`, which presses keys on whatever machine
//! runs the tests.  `MockInputSender` records each event in a
//! `Mutex<Vec<...>>` instead so assertions can inspect exactly what was sent
//! and in what order.
//!
//! # `fail_after` limit
//!
//! Set `fail_after = Some(n)` to make every call after the first `n`
//! successful sends return [`EmulationError::Platform`].  This lets you test
//! error-handling paths without a broken OS.

use std::sync::Mutex;

use keybridge_core::InputEvent;

use crate::application::emulate_input::{validate, EmulationError, InputSender};

/// A mock sender that records all calls without performing OS API calls.
#[derive(Default)]
pub struct MockInputSender {
    /// Every event accepted by `send`, in call order.
    pub sent: Mutex<Vec<InputEvent>>,
    /// Number of successful sends allowed before failures begin.
    pub fail_after: Option<usize>,
}

impl MockInputSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sender that fails once `n` events have been sent.
    pub fn failing_after(n: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_after: Some(n),
        }
    }

    /// Snapshot of the recorded events.
    pub fn sent(&self) -> Vec<InputEvent> {
        self.sent.lock().unwrap().clone()
    }
}

impl InputSender for MockInputSender {
    fn send(&self, event: InputEvent) -> Result<(), EmulationError> {
        let event = validate(event)?;
        let mut sent = self.sent.lock().unwrap();
        if self.fail_after.is_some_and(|limit| sent.len() >= limit) {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        sent.push(event);
        Ok(())
    }
}
