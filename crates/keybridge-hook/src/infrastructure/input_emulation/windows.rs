//! Windows input emulation via the SendInput API.
//!
//! Keyboard events are injected by virtual-key code; mouse events are the
//! left/right button transitions at the current cursor position.

#![cfg(target_os = "windows")]

use keybridge_core::{Action, InputEvent};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_KEYUP, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_RIGHTDOWN,
    MOUSEEVENTF_RIGHTUP, MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
};

use crate::application::emulate_input::{validate, EmulationError, InputSender};

/// Windows implementation of [`InputSender`] using SendInput.
pub struct WindowsInputSender;

impl WindowsInputSender {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsInputSender {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSender for WindowsInputSender {
    fn send(&self, event: InputEvent) -> Result<(), EmulationError> {
        let event = validate(event)?;
        let input = if event.is_keyboard() {
            keyboard_input(event)?
        } else {
            mouse_input(event.action)
        };

        // SAFETY: input is a fully initialised INPUT structure on the stack.
        let inserted = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if inserted != 1 {
            return Err(EmulationError::Platform(format!(
                "SendInput inserted {inserted} events: {}",
                std::io::Error::last_os_error()
            )));
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn keyboard_input(event: InputEvent) -> Result<INPUT, EmulationError> {
    let vk = u16::try_from(event.code)
        .map_err(|_| EmulationError::Platform(format!("key code {} out of range", event.code)))?;
    let flags = if event.action == Action::KeyUp {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    };

    Ok(INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    })
}

fn mouse_input(action: Action) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: mouse_flags(action),
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn mouse_flags(action: Action) -> MOUSE_EVENT_FLAGS {
    match action {
        Action::LeftMouseDown => MOUSEEVENTF_LEFTDOWN,
        Action::LeftMouseUp => MOUSEEVENTF_LEFTUP,
        Action::RightMouseDown => MOUSEEVENTF_RIGHTDOWN,
        Action::RightMouseUp => MOUSEEVENTF_RIGHTUP,
        // Filtered out by `validate` and the keyboard branch.
        Action::None | Action::KeyDown | Action::KeyUp => MOUSE_EVENT_FLAGS(0),
    }
}
