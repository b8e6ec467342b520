//! Mock hook host for unit and integration testing.
//!
//! Behaves like the Win32 host without touching the OS:
//!
//! - `install` / `uninstall` are recorded and can be made to fail per kind.
//! - `run_message_loop` really blocks, pumping a queue of injected raw
//!   messages.  Hook callbacks (translate + deposit + pass-through) run on
//!   the loop's thread, exactly as they would under Windows.
//! - `quit_message_loop` and [`MockHookHost::terminate`] both end the loop;
//!   the first is the bridge asking, the second simulates the host itself
//!   posting `WM_QUIT`.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use keybridge_core::EventMailbox;

use super::translate::{translate_keyboard, translate_mouse};
use crate::application::bridge::{CaptureError, HookHandle, HookHost, HookKind};

/// A raw message waiting in the mock host's queue.
#[derive(Debug, Clone, Copy)]
enum RawMessage {
    Keyboard { message: u32, vk_code: u32 },
    Mouse { message: u32 },
    Quit,
}

#[derive(Default)]
struct MockState {
    next_handle: usize,
    live: Vec<(HookHandle, HookKind, Arc<EventMailbox>)>,
    fail_on: Option<HookKind>,
    installs: Vec<HookKind>,
    uninstalls: usize,
    /// Raw messages handed on to the next listener in the chain.
    chained: usize,
    quit_requests: usize,
}

/// A mock implementation of [`HookHost`] that allows tests to inject raw messages.
pub struct MockHookHost {
    state: Mutex<MockState>,
    queue_tx: Sender<RawMessage>,
    queue_rx: Mutex<Receiver<RawMessage>>,
}

impl MockHookHost {
    /// Creates a host that accepts every install.
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = mpsc::channel();
        Self {
            state: Mutex::new(MockState {
                next_handle: 1,
                ..MockState::default()
            }),
            queue_tx,
            queue_rx: Mutex::new(queue_rx),
        }
    }

    /// Creates a host that refuses to install hooks of `kind`.
    pub fn failing(kind: HookKind) -> Self {
        let host = Self::new();
        host.state.lock().unwrap().fail_on = Some(kind);
        host
    }

    /// Queues a raw keyboard message (`WM_KEYDOWN`, ...) for the loop.
    pub fn inject_keyboard(&self, message: u32, vk_code: u32) {
        self.queue_tx
            .send(RawMessage::Keyboard { message, vk_code })
            .ok();
    }

    /// Queues a raw mouse message (`WM_LBUTTONDOWN`, `WM_MOUSEMOVE`, ...) for the loop.
    pub fn inject_mouse(&self, message: u32) {
        self.queue_tx.send(RawMessage::Mouse { message }).ok();
    }

    /// Ends the message loop as if the host environment had terminated it.
    pub fn terminate(&self) {
        self.queue_tx.send(RawMessage::Quit).ok();
    }

    /// Kinds passed to `install`, in call order (including refused ones).
    pub fn installs(&self) -> Vec<HookKind> {
        self.state.lock().unwrap().installs.clone()
    }

    /// Number of hooks currently installed.
    pub fn live_hooks(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    /// Number of `uninstall` calls that removed a live hook.
    pub fn uninstall_count(&self) -> usize {
        self.state.lock().unwrap().uninstalls
    }

    /// Number of raw messages passed on to the next listener.
    pub fn chained_count(&self) -> usize {
        self.state.lock().unwrap().chained
    }

    /// Number of `quit_message_loop` calls.
    pub fn quit_requests(&self) -> usize {
        self.state.lock().unwrap().quit_requests
    }

    /// Runs every hook of `kind` for one raw message, then passes it on.
    fn dispatch(&self, kind: HookKind, raw: RawMessage) {
        let mailboxes: Vec<Arc<EventMailbox>> = {
            let state = self.state.lock().unwrap();
            state
                .live
                .iter()
                .filter(|(_, k, _)| *k == kind)
                .map(|(_, _, mailbox)| Arc::clone(mailbox))
                .collect()
        };

        let event = match raw {
            RawMessage::Keyboard { message, vk_code } => translate_keyboard(message, vk_code),
            RawMessage::Mouse { message } => translate_mouse(message),
            RawMessage::Quit => None,
        };

        for mailbox in &mailboxes {
            if let Some(event) = event {
                mailbox.deposit(event);
            }
            self.state.lock().unwrap().chained += 1;
        }
    }
}

impl Default for MockHookHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HookHost for MockHookHost {
    fn install(
        &self,
        kind: HookKind,
        mailbox: Arc<EventMailbox>,
    ) -> Result<HookHandle, CaptureError> {
        let mut state = self.state.lock().unwrap();
        state.installs.push(kind);
        if state.fail_on == Some(kind) {
            return Err(CaptureError::install_failed(kind, "mock refused hook"));
        }
        let handle = HookHandle::from_raw(state.next_handle);
        state.next_handle += 1;
        state.live.push((handle, kind, mailbox));
        Ok(handle)
    }

    fn uninstall(&self, handle: HookHandle) {
        let mut state = self.state.lock().unwrap();
        let before = state.live.len();
        state.live.retain(|(h, _, _)| *h != handle);
        if state.live.len() < before {
            state.uninstalls += 1;
        }
    }

    fn run_message_loop(&self) -> Result<(), CaptureError> {
        let queue = self.queue_rx.lock().unwrap();
        loop {
            match queue.recv() {
                Ok(RawMessage::Quit) => return Ok(()),
                Ok(raw @ RawMessage::Keyboard { .. }) => self.dispatch(HookKind::Keyboard, raw),
                Ok(raw @ RawMessage::Mouse { .. }) => self.dispatch(HookKind::Mouse, raw),
                Err(e) => return Err(CaptureError::MessageLoop(e.to_string())),
            }
        }
    }

    fn quit_message_loop(&self) {
        self.state.lock().unwrap().quit_requests += 1;
        self.queue_tx.send(RawMessage::Quit).ok();
    }
}
