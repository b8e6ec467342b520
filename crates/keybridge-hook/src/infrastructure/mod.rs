//! Infrastructure layer for the hook host.
//!
//! Contains OS-facing adapters: low-level input hooks, synthetic input,
//! clipboard access, and config-file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `keybridge_core`, but MUST NOT be imported by the `application` layer.

pub mod clipboard;
pub mod input_capture;
pub mod input_emulation;
pub mod storage;
