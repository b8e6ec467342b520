//! Human-readable key names.
//!
//! Bindings in the config file (and anything else a person types) name keys
//! the way people say them: `"ctrl down"`, `"f8"`, `"left click"`.  This
//! module turns those names into [`InputEvent`]s.
//!
//! # Grammar
//!
//! ```text
//! name    := mouse | key [" down" | " up"]
//! mouse   := "left click" [" down" | " up"] | "right click" [" down" | " up"]
//! key     := "0".."9" | "a".."z" | "f1".."f12" | "alt" | "ctrl" | "left ctrl" | ...
//! ```
//!
//! Matching is case-insensitive and ignores surrounding or repeated
//! whitespace.  A bare key name means a press.

pub mod windows_vk;

use thiserror::Error;

use crate::event::{Action, InputEvent};

/// Error returned when a key name cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyNameError {
    #[error("unknown key name {0:?}")]
    Unknown(String),
    #[error("empty key name")]
    Empty,
}

/// A key name resolved together with whether it spelled out a direction.
///
/// `"a"` and `"left click"` are *undirected*: they resolve to the press,
/// but a caller that wants a full click or keystroke may follow them with
/// [`InputEvent::released`].  `"a down"`, `"a up"` and `"left click up"` are
/// *directed* and mean exactly that one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub event: InputEvent,
    pub directed: bool,
}

/// Parses a key or mouse-button name into the event it describes.
///
/// # Examples
///
/// ```rust
/// use keybridge_core::{parse_input, Action, InputEvent};
///
/// assert_eq!(parse_input("a").unwrap(), InputEvent::key_down(0x41));
/// assert_eq!(parse_input("Ctrl Up").unwrap(), InputEvent::key_up(0x11));
/// assert_eq!(parse_input("left click").unwrap(), InputEvent::mouse(Action::LeftMouseDown));
/// ```
///
/// # Errors
///
/// Returns [`KeyNameError::Empty`] for a blank name and
/// [`KeyNameError::Unknown`] for anything not in the table.
pub fn parse_input(name: &str) -> Result<InputEvent, KeyNameError> {
    parse_key_spec(name).map(|spec| spec.event)
}

/// Like [`parse_input`], but also reports whether the name was directed.
pub fn parse_key_spec(name: &str) -> Result<KeySpec, KeyNameError> {
    let normalized = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(KeyNameError::Empty);
    }

    if let Some((action, directed)) = mouse_action(&normalized) {
        return Ok(KeySpec {
            event: InputEvent::mouse(action),
            directed,
        });
    }

    // The whole name first: "up" and "down" are themselves key names.
    if let Some(vk) = windows_vk::name_to_vk(&normalized) {
        return Ok(KeySpec {
            event: InputEvent::key_down(vk),
            directed: false,
        });
    }
    if let Some(vk) = normalized
        .strip_suffix(" down")
        .and_then(windows_vk::name_to_vk)
    {
        return Ok(KeySpec {
            event: InputEvent::key_down(vk),
            directed: true,
        });
    }
    if let Some(vk) = normalized
        .strip_suffix(" up")
        .and_then(windows_vk::name_to_vk)
    {
        return Ok(KeySpec {
            event: InputEvent::key_up(vk),
            directed: true,
        });
    }

    Err(KeyNameError::Unknown(name.trim().to_string()))
}

/// Converts text into one key press per byte of its upper-cased form.
///
/// Letters and digits produce their VK code; any other byte is passed
/// through as its raw value.
pub fn keys(text: &str) -> Vec<InputEvent> {
    text.to_ascii_uppercase()
        .bytes()
        .map(|b| InputEvent::key_down(u32::from(b)))
        .collect()
}

fn mouse_action(name: &str) -> Option<(Action, bool)> {
    match name {
        "left click" => Some((Action::LeftMouseDown, false)),
        "left click down" => Some((Action::LeftMouseDown, true)),
        "left click up" => Some((Action::LeftMouseUp, true)),
        "right click" => Some((Action::RightMouseDown, false)),
        "right click down" => Some((Action::RightMouseDown, true)),
        "right click up" => Some((Action::RightMouseUp, true)),
        _ => None,
    }
}
