//! Raw hook message → [`InputEvent`] translation.
//!
//! The Win32 message identifiers are repeated here as plain `u32` constants
//! (values from winuser.h) so the translation can be unit-tested on every
//! platform, not only where the `windows` crate is available.

use keybridge_core::{Action, InputEvent};

pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;

pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_XBUTTONDOWN: u32 = 0x020B;
pub const WM_XBUTTONUP: u32 = 0x020C;
pub const WM_MOUSEHWHEEL: u32 = 0x020E;

/// Translates a low-level keyboard hook message.
///
/// `WM_SYSKEY*` (keys pressed with Alt held, and Alt itself) count as
/// ordinary presses and releases.  Returns `None` for anything else.
pub fn translate_keyboard(message: u32, vk_code: u32) -> Option<InputEvent> {
    match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(InputEvent::key_down(vk_code)),
        WM_KEYUP | WM_SYSKEYUP => Some(InputEvent::key_up(vk_code)),
        _ => None,
    }
}

/// Translates a low-level mouse hook message.
///
/// Only left and right button transitions are forwarded; movement, wheel,
/// middle and X buttons return `None`.
pub fn translate_mouse(message: u32) -> Option<InputEvent> {
    let action = match message {
        WM_LBUTTONDOWN => Action::LeftMouseDown,
        WM_LBUTTONUP => Action::LeftMouseUp,
        WM_RBUTTONDOWN => Action::RightMouseDown,
        WM_RBUTTONUP => Action::RightMouseUp,
        _ => return None,
    };
    Some(InputEvent::mouse(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_translates_to_press_with_code() {
        assert_eq!(
            translate_keyboard(WM_KEYDOWN, 0x4B),
            Some(InputEvent {
                code: 0x4B,
                action: Action::KeyDown
            })
        );
    }

    #[test]
    fn test_key_up_translates_to_release_with_code() {
        assert_eq!(
            translate_keyboard(WM_KEYUP, 0x4B),
            Some(InputEvent {
                code: 0x4B,
                action: Action::KeyUp
            })
        );
    }

    #[test]
    fn test_sys_key_messages_translate_like_plain_keys() {
        assert_eq!(
            translate_keyboard(WM_SYSKEYDOWN, 0x12),
            Some(InputEvent::key_down(0x12))
        );
        assert_eq!(
            translate_keyboard(WM_SYSKEYUP, 0x12),
            Some(InputEvent::key_up(0x12))
        );
    }

    #[test]
    fn test_unrelated_keyboard_message_is_ignored() {
        assert_eq!(translate_keyboard(WM_MOUSEMOVE, 0x41), None);
        assert_eq!(translate_keyboard(0, 0x41), None);
    }

    #[test]
    fn test_left_button_down_has_zero_code_and_mouse_action() {
        // Act
        let event = translate_mouse(WM_LBUTTONDOWN).expect("left down is tracked");

        // Assert
        assert_eq!(event.code, 0);
        assert_eq!(event.action, Action::LeftMouseDown);
        assert_ne!(event.action, Action::KeyDown);
        assert_ne!(event.action, Action::KeyUp);
    }

    #[test]
    fn test_every_tracked_button_transition_is_distinct() {
        let actions: Vec<Action> = [WM_LBUTTONDOWN, WM_LBUTTONUP, WM_RBUTTONDOWN, WM_RBUTTONUP]
            .into_iter()
            .map(|m| translate_mouse(m).unwrap().action)
            .collect();

        for (i, a) in actions.iter().enumerate() {
            assert!(a.is_mouse());
            assert!(!actions[i + 1..].contains(a), "{a:?} produced twice");
        }
    }

    #[test]
    fn test_untracked_mouse_messages_are_not_forwarded() {
        for message in [
            WM_MOUSEMOVE,
            WM_MBUTTONDOWN,
            WM_MBUTTONUP,
            WM_MOUSEWHEEL,
            WM_MOUSEHWHEEL,
            WM_XBUTTONDOWN,
            WM_XBUTTONUP,
        ] {
            assert_eq!(translate_mouse(message), None, "message {message:#06x}");
        }
    }
}
