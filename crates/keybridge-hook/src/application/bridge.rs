//! InputBridge: installs the input hooks, pumps host messages, and shuts down.
//!
//! This is the hook lifecycle manager.  It owns the hook registrations and
//! the [`EventMailbox`] they deposit into, and moves through a one-way state
//! machine:
//!
//! ```text
//! Uninstalled ──start()──▶ Running ──stop() / host quit──▶ Stopped
//!      │                                                      ▲
//!      └──────────────stop() or install failure───────────────┘
//! ```
//!
//! `Stopped` is terminal; a fresh bridge is needed to capture again.
//!
//! # Threads
//!
//! [`InputBridge::start`] blocks for the whole time the bridge is running,
//! because the host only fires hook callbacks while the installing thread is
//! inside its message loop.  Run it on a dedicated thread.  Consumers call
//! [`InputBridge::take_next`] (or use [`InputBridge::mailbox`]) from their own
//! thread, and any thread may call [`InputBridge::stop`].
//!
//! # Architecture
//!
//! The OS is reached only through the [`HookHost`] trait.  The Windows
//! implementation lives in `infrastructure::input_capture::windows`; tests use
//! `infrastructure::input_capture::mock::MockHookHost`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use keybridge_core::{EventMailbox, InputEvent};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error type for hook lifecycle operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to install keyboard hook: {0}")]
    KeyboardHookInstallFailed(String),
    #[error("failed to install mouse hook: {0}")]
    MouseHookInstallFailed(String),
    #[error("bridge is already running")]
    AlreadyRunning,
    #[error("bridge has already been stopped")]
    AlreadyStopped,
    #[error("host message loop failed: {0}")]
    MessageLoop(String),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

impl CaptureError {
    /// Builds the install-failure variant matching `kind`.
    pub fn install_failed(kind: HookKind, reason: impl Into<String>) -> Self {
        match kind {
            HookKind::Keyboard => Self::KeyboardHookInstallFailed(reason.into()),
            HookKind::Mouse => Self::MouseHookInstallFailed(reason.into()),
        }
    }
}

/// The two low-level listeners the bridge registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Keyboard,
    Mouse,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyboard => f.write_str("keyboard"),
            Self::Mouse => f.write_str("mouse"),
        }
    }
}

/// Opaque token for one installed hook.  Only the host that issued it can
/// interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle(usize);

impl HookHandle {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> usize {
        self.0
    }
}

/// The host windowing environment, as seen by the bridge.
///
/// Implementations translate each raw callback into an [`InputEvent`],
/// deposit it into the mailbox passed to [`install`](Self::install), and
/// always hand the raw event on to the next listener in the host's chain.
pub trait HookHost: Send + Sync {
    /// Registers a listener of `kind` on the calling thread.
    fn install(&self, kind: HookKind, mailbox: Arc<EventMailbox>)
        -> Result<HookHandle, CaptureError>;

    /// Removes a listener.  Removing one that is already gone is a no-op.
    fn uninstall(&self, handle: HookHandle);

    /// Retrieves and dispatches host messages until asked to quit or the host
    /// terminates the loop.  Must run on the thread that called `install`.
    fn run_message_loop(&self) -> Result<(), CaptureError>;

    /// Asks the message loop to return.  Callable from any thread, including
    /// before the loop has been entered.
    fn quit_message_loop(&self);
}

/// Lifecycle state of an [`InputBridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Created; no hooks installed yet.
    Uninstalled,
    /// Hooks installed and the message loop is (about to be) pumping.
    Running,
    /// Terminal.  Hooks removed, mailbox shut down.
    Stopped,
}

#[derive(Debug)]
struct Lifecycle {
    state: BridgeState,
    handles: Vec<HookHandle>,
}

/// Connects OS hook callbacks to a blocking consumer.
pub struct InputBridge {
    host: Arc<dyn HookHost>,
    mailbox: Arc<EventMailbox>,
    lifecycle: Mutex<Lifecycle>,
}

impl InputBridge {
    /// Creates an uninstalled bridge with a fresh mailbox.
    pub fn new(host: Arc<dyn HookHost>) -> Self {
        Self {
            host,
            mailbox: Arc::new(EventMailbox::new()),
            lifecycle: Mutex::new(Lifecycle {
                state: BridgeState::Uninstalled,
                handles: Vec::new(),
            }),
        }
    }

    /// The mailbox consumers read from.
    pub fn mailbox(&self) -> Arc<EventMailbox> {
        Arc::clone(&self.mailbox)
    }

    /// Blocks until the next event, or returns [`InputEvent::SENTINEL`] once
    /// the bridge has stopped and nothing is pending.
    pub fn take_next(&self) -> InputEvent {
        self.mailbox.take_next()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        self.lock().state
    }

    /// Number of hook registrations currently live.
    pub fn active_listeners(&self) -> usize {
        self.lock().handles.len()
    }

    /// Installs the keyboard and mouse hooks, then runs the host message loop
    /// on the calling thread until [`stop`](Self::stop) is called or the host
    /// ends the loop.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::AlreadyRunning`] / [`CaptureError::AlreadyStopped`]
    ///   if the bridge is not in the `Uninstalled` state.
    /// - [`CaptureError::KeyboardHookInstallFailed`] /
    ///   [`CaptureError::MouseHookInstallFailed`] if the host refuses a hook.
    ///   Any hook already installed is removed and the bridge is stopped; the
    ///   loop is never entered with partial coverage.
    /// - [`CaptureError::MessageLoop`] if the host loop fails.
    pub fn start(&self) -> Result<(), CaptureError> {
        {
            let mut lifecycle = self.lock();
            match lifecycle.state {
                BridgeState::Running => return Err(CaptureError::AlreadyRunning),
                BridgeState::Stopped => return Err(CaptureError::AlreadyStopped),
                BridgeState::Uninstalled => {}
            }

            for kind in [HookKind::Keyboard, HookKind::Mouse] {
                match self.host.install(kind, Arc::clone(&self.mailbox)) {
                    Ok(handle) => {
                        debug!(%kind, ?handle, "hook installed");
                        lifecycle.handles.push(handle);
                    }
                    Err(e) => {
                        warn!(%kind, error = %e, "hook installation failed; removing partial hooks");
                        self.teardown(&mut lifecycle);
                        return Err(e);
                    }
                }
            }

            lifecycle.state = BridgeState::Running;
            info!(
                listeners = lifecycle.handles.len(),
                "input hooks installed, entering message loop"
            );
        }

        let result = self.host.run_message_loop();

        let mut lifecycle = self.lock();
        if lifecycle.state == BridgeState::Running {
            info!("host ended the message loop");
        }
        self.teardown(&mut lifecycle);
        result
    }

    /// Removes every hook, releases the message loop, and shuts down the
    /// mailbox so blocked consumers return.
    ///
    /// Callable from any thread.  Calling it again, or before `start`, is
    /// harmless.
    pub fn stop(&self) {
        let mut lifecycle = self.lock();
        let previous = lifecycle.state;
        self.teardown(&mut lifecycle);

        match previous {
            BridgeState::Running => {
                self.host.quit_message_loop();
                info!("input bridge stopped");
            }
            BridgeState::Uninstalled => info!("input bridge stopped before it was started"),
            BridgeState::Stopped => debug!("stop() on an already stopped bridge"),
        }
    }

    /// Uninstalls live hooks, enters `Stopped`, and signals mailbox shutdown.
    fn teardown(&self, lifecycle: &mut Lifecycle) {
        for handle in lifecycle.handles.drain(..) {
            self.host.uninstall(handle);
            debug!(?handle, "hook removed");
        }
        lifecycle.state = BridgeState::Stopped;
        self.mailbox.signal_shutdown();
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for InputBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lifecycle = self.lock();
        f.debug_struct("InputBridge")
            .field("state", &lifecycle.state)
            .field("handles", &lifecycle.handles)
            .finish_non_exhaustive()
    }
}
