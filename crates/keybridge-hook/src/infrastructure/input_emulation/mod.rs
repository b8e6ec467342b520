//! Platform-specific input emulation implementations.
//!
//! The correct implementation is selected at compile time via `#[cfg(target_os = ...)]`.

use std::sync::Arc;

use crate::application::emulate_input::{EmulationError, InputSender};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Returns the input sender for the current platform.
///
/// # Errors
///
/// Returns [`EmulationError::UnsupportedPlatform`] where no sender exists.
pub fn platform_sender() -> Result<Arc<dyn InputSender>, EmulationError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsInputSender::new()))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(EmulationError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
