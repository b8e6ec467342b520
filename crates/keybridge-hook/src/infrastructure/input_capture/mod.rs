//! Input capture infrastructure.
//!
//! On Windows, this installs low-level keyboard and mouse hooks (WH_KEYBOARD_LL,
//! WH_MOUSE_LL) on the thread that runs [`InputBridge::start`], and pumps that
//! thread's Win32 message loop so the hooks fire.
//!
//! # Windows-Specific Implementation
//!
//! The hook callbacks must complete within ~300ms or Windows will remove the hook.
//! Each callback therefore does exactly two things: translate the raw message
//! (see [`translate`]) and deposit the result into the bridge's mailbox.
//!
//! # Testability
//!
//! The [`HookHost`] trait allows unit tests to inject synthetic events without
//! requiring Windows hooks; see [`mock::MockHookHost`].
//!
//! [`InputBridge::start`]: crate::application::bridge::InputBridge::start

use std::sync::Arc;

use crate::application::bridge::{CaptureError, HookHost};

pub mod mock;
pub mod translate;

#[cfg(target_os = "windows")]
pub mod windows;

/// Returns the hook host for the current platform.
///
/// # Errors
///
/// Returns [`CaptureError::UnsupportedPlatform`] where low-level hooks are
/// not available.
pub fn platform_host() -> Result<Arc<dyn HookHost>, CaptureError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsHookHost::new()))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(CaptureError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
