//! # keybridge-core
//!
//! Shared library for KeyBridge containing the input event model, the
//! single-slot event mailbox, and the key-name table.
//!
//! This crate is used by the hook host and by anything that consumes its
//! events.  It has zero dependencies on OS APIs, so everything in it compiles
//! and tests on any platform.
//!
//! # Architecture overview (for beginners)
//!
//! KeyBridge watches system-wide keyboard and mouse activity.  The operating
//! system calls a *hook callback* on a dedicated "pump" thread every time a
//! key or button changes state.  That callback is not allowed to block, yet
//! application code usually wants to write a simple loop of the form
//! "wait for the next event, handle it, repeat".
//!
//! This crate provides the pieces that bridge those two worlds:
//!
//! - **`event`** – The [`InputEvent`] value type: a key/button code plus an
//!   [`Action`] (press, release, left click, ...).
//!
//! - **`mailbox`** – The [`EventMailbox`]: a one-slot, thread-safe handoff
//!   point.  The callback deposits, the consumer blocks in `take_next()`.
//!
//! - **`keymap`** – Human-readable key names (`"ctrl down"`, `"left click"`)
//!   and the Windows virtual-key constants they resolve to.

pub mod event;
pub mod keymap;
pub mod mailbox;

// Re-export the most-used types at the crate root so callers can write
// `keybridge_core::EventMailbox` instead of `keybridge_core::mailbox::EventMailbox`.
pub use event::{Action, InputEvent};
pub use keymap::{keys, parse_input, parse_key_spec, KeyNameError, KeySpec};
pub use mailbox::EventMailbox;
