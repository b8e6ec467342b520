//! ConsumerLoop: the application side of the bridge.
//!
//! Pulls events from an [`InputBridge`] one at a time on the consumer
//! thread, reports each to a caller-supplied handler, and reacts to the two
//! configured bindings:
//!
//! - the **stop** binding calls [`InputBridge::stop`] and ends the loop;
//! - the **clipboard** binding reads the clipboard text and reports it.
//!
//! The loop also ends when the bridge shuts down for any other reason
//! (Ctrl-C, host termination, install failure), because `take_next` then
//! returns the sentinel.

use std::sync::Arc;

use keybridge_core::InputEvent;
use tracing::{debug, info, trace};

use super::bridge::InputBridge;

/// Read-only access to the system clipboard.
///
/// Implementations return an empty string when no text is available for any
/// reason; callers never see a clipboard error.
pub trait ClipboardReader: Send + Sync {
    fn read_text(&self) -> String;
}

/// Events the loop reacts to specially.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bindings {
    pub stop: Option<InputEvent>,
    pub clipboard: Option<InputEvent>,
}

/// What the handler passed to [`ConsumerLoop::run`] is told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consumed {
    /// An event taken from the mailbox.
    Input(InputEvent),
    /// Clipboard text read because the clipboard binding fired.
    Clipboard(String),
}

/// Totals reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Events taken from the mailbox.
    pub events: u64,
    /// Events the producer overwrote before this consumer could take them.
    pub dropped: u64,
    /// `true` if the loop ended because the stop binding fired.
    pub stopped_by_binding: bool,
}

pub struct ConsumerLoop<'a> {
    bridge: &'a InputBridge,
    bindings: Bindings,
    clipboard: Arc<dyn ClipboardReader>,
}

impl<'a> ConsumerLoop<'a> {
    pub fn new(
        bridge: &'a InputBridge,
        bindings: Bindings,
        clipboard: Arc<dyn ClipboardReader>,
    ) -> Self {
        Self {
            bridge,
            bindings,
            clipboard,
        }
    }

    /// Runs until the bridge shuts down or the stop binding fires.
    pub fn run(&self, mut handler: impl FnMut(Consumed)) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        let mailbox = self.bridge.mailbox();

        loop {
            let event = self.bridge.take_next();
            if event.is_sentinel() {
                debug!("mailbox shut down, consumer exiting");
                break;
            }
            stats.events += 1;

            // The hook callback cannot log, so overwrites are reported here.
            let overwritten = mailbox.overwritten();
            if overwritten > stats.dropped {
                trace!(
                    lost = overwritten - stats.dropped,
                    "events overwritten before this one was taken"
                );
                stats.dropped = overwritten;
            }
            handler(Consumed::Input(event));

            if Some(event) == self.bindings.clipboard {
                handler(Consumed::Clipboard(self.clipboard.read_text()));
            }

            if Some(event) == self.bindings.stop {
                info!(code = event.code, "stop binding pressed");
                stats.stopped_by_binding = true;
                self.bridge.stop();
                break;
            }
        }

        stats.dropped = mailbox.overwritten();
        stats
    }
}
