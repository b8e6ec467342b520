//! Input event value type shared by the hook callbacks and consumers.
//!
//! An [`InputEvent`] is deliberately tiny: a device-specific code and an
//! [`Action`].  It is `Copy`, so the mailbox copies it in on deposit and out
//! again on retrieval; no ownership ever crosses the thread boundary.

use serde::{Deserialize, Serialize};

/// What happened to the key or button identified by [`InputEvent::code`].
///
/// The numeric values are stable: they are what [`Action::as_raw`] returns
/// and what consumers that store events as plain integers rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum Action {
    /// No action.  Only ever seen in [`InputEvent::SENTINEL`].
    #[default]
    None = 0,
    /// A key was pressed.
    KeyDown = 1,
    /// A key was released.
    KeyUp = 2,
    /// The left mouse button was pressed.
    LeftMouseDown = 3,
    /// The left mouse button was released.
    LeftMouseUp = 4,
    /// The right mouse button was pressed.
    RightMouseDown = 5,
    /// The right mouse button was released.
    RightMouseUp = 6,
}

impl Action {
    /// Returns the stable integer value of this action.
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Converts a raw integer back into an `Action`.
    ///
    /// Returns `None` for values outside the defined range.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::KeyDown),
            2 => Some(Self::KeyUp),
            3 => Some(Self::LeftMouseDown),
            4 => Some(Self::LeftMouseUp),
            5 => Some(Self::RightMouseDown),
            6 => Some(Self::RightMouseUp),
            _ => None,
        }
    }

    /// `true` for key press/release.
    pub const fn is_keyboard(self) -> bool {
        matches!(self, Self::KeyDown | Self::KeyUp)
    }

    /// `true` for the tracked mouse button transitions.
    pub const fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::LeftMouseDown | Self::LeftMouseUp | Self::RightMouseDown | Self::RightMouseUp
        )
    }
}

/// A single captured input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InputEvent {
    /// Windows virtual-key code for keyboard events; always 0 for mouse events.
    pub code: u32,
    /// The transition that occurred.
    pub action: Action,
}

impl InputEvent {
    /// The empty event returned by the mailbox after shutdown when nothing is pending.
    pub const SENTINEL: InputEvent = InputEvent {
        code: 0,
        action: Action::None,
    };

    /// Creates a key press event for `code`.
    pub const fn key_down(code: u32) -> Self {
        Self {
            code,
            action: Action::KeyDown,
        }
    }

    /// Creates a key release event for `code`.
    pub const fn key_up(code: u32) -> Self {
        Self {
            code,
            action: Action::KeyUp,
        }
    }

    /// Creates a mouse button event.  Mouse events carry no key identifier.
    pub const fn mouse(action: Action) -> Self {
        Self { code: 0, action }
    }

    /// `true` if this is the zeroed sentinel rather than a real event.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// `true` for key press/release events.
    pub const fn is_keyboard(&self) -> bool {
        self.action.is_keyboard()
    }

    /// `true` for mouse button events.
    pub const fn is_mouse(&self) -> bool {
        self.action.is_mouse()
    }

    /// The release matching this press: key-down becomes key-up and a
    /// button-down becomes the same button's up.  Anything else is returned
    /// unchanged.
    pub const fn released(self) -> Self {
        let action = match self.action {
            Action::KeyDown => Action::KeyUp,
            Action::LeftMouseDown => Action::LeftMouseUp,
            Action::RightMouseDown => Action::RightMouseUp,
            other => other,
        };
        Self {
            code: self.code,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ACTIONS: [Action; 7] = [
        Action::None,
        Action::KeyDown,
        Action::KeyUp,
        Action::LeftMouseDown,
        Action::LeftMouseUp,
        Action::RightMouseDown,
        Action::RightMouseUp,
    ];

    #[test]
    fn test_sentinel_is_zeroed() {
        assert_eq!(InputEvent::SENTINEL.code, 0);
        assert_eq!(InputEvent::SENTINEL.action.as_raw(), 0);
        assert_eq!(InputEvent::default(), InputEvent::SENTINEL);
        assert!(InputEvent::SENTINEL.is_sentinel());
    }

    #[test]
    fn test_action_raw_values_are_stable() {
        assert_eq!(Action::KeyDown.as_raw(), 1);
        assert_eq!(Action::KeyUp.as_raw(), 2);
        assert_eq!(Action::LeftMouseDown.as_raw(), 3);
        assert_eq!(Action::LeftMouseUp.as_raw(), 4);
        assert_eq!(Action::RightMouseDown.as_raw(), 5);
        assert_eq!(Action::RightMouseUp.as_raw(), 6);
    }

    #[test]
    fn test_action_from_raw_accepts_every_defined_value() {
        for action in ALL_ACTIONS {
            assert_eq!(Action::from_raw(action.as_raw()), Some(action));
        }
        assert_eq!(Action::from_raw(7), None);
        assert_eq!(Action::from_raw(u32::MAX), None);
    }

    #[test]
    fn test_keyboard_and_mouse_actions_never_overlap() {
        for action in ALL_ACTIONS {
            assert!(
                !(action.is_keyboard() && action.is_mouse()),
                "{action:?} classified as both keyboard and mouse"
            );
        }
        assert!(!Action::None.is_keyboard());
        assert!(!Action::None.is_mouse());
    }

    #[test]
    fn test_mouse_constructor_zeroes_code() {
        let event = InputEvent::mouse(Action::LeftMouseDown);
        assert_eq!(event.code, 0);
        assert!(event.is_mouse());
        assert!(!event.is_sentinel());
    }

    #[test]
    fn test_key_constructors_keep_code() {
        assert_eq!(InputEvent::key_down(0x41).code, 0x41);
        assert_eq!(InputEvent::key_down(0x41).action, Action::KeyDown);
        assert_eq!(InputEvent::key_up(0x41).action, Action::KeyUp);
        assert!(InputEvent::key_up(0x41).is_keyboard());
    }

    #[test]
    fn test_released_maps_each_press_to_its_release() {
        assert_eq!(InputEvent::key_down(0x41).released(), InputEvent::key_up(0x41));
        assert_eq!(
            InputEvent::mouse(Action::LeftMouseDown).released(),
            InputEvent::mouse(Action::LeftMouseUp)
        );
        assert_eq!(
            InputEvent::mouse(Action::RightMouseDown).released(),
            InputEvent::mouse(Action::RightMouseUp)
        );
        // Releases and the sentinel are left alone.
        assert_eq!(InputEvent::key_up(0x41).released(), InputEvent::key_up(0x41));
        assert!(InputEvent::SENTINEL.released().is_sentinel());
    }

    #[test]
    fn test_event_serializes_action_by_name() {
        // Arrange
        let event = InputEvent::key_up(0x1B);

        // Act
        let text = toml::to_string(&event).expect("serialize");
        let restored: InputEvent = toml::from_str(&text).expect("deserialize");

        // Assert
        assert!(text.contains("code = 27"), "got {text}");
        assert!(text.contains(r#"action = "KeyUp""#), "got {text}");
        assert_eq!(restored, event);
    }

    #[test]
    fn test_event_with_unknown_action_name_is_rejected() {
        let result: Result<InputEvent, _> = toml::from_str("code = 1\naction = \"Scroll\"\n");
        assert!(result.is_err());
    }
}
