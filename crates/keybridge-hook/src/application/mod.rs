//! Application layer of the hook host.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (here: the event model and mailbox in `keybridge-core`) and the
//! infrastructure (Win32 hooks, the clipboard, config files).
//!
//! Code in this layer:
//!
//! - **Orchestrates** the domain types to fulfil a user goal (e.g., "install
//!   the hooks and hand each keystroke to the consumer thread").
//! - **Depends on abstractions** (traits such as `HookHost`) rather than
//!   concrete OS calls, so it can be tested anywhere with mocks.
//!
//! # Sub-modules
//!
//! - **`bridge`**        – The hook lifecycle manager: install, pump, stop.
//! - **`consume`**       – The consumer loop that reads events and reacts to
//!   configured bindings.
//! - **`emulate_input`** – The contract for injecting synthetic input.
//! - **`script`**        – Automation scripts replayed through an
//!   `InputSender`, on startup or on a watched key.

pub mod bridge;
pub mod consume;
pub mod emulate_input;
pub mod script;
