//! Windows Virtual Key (VK) code constants and the key-name lookup table.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//!
//! # What is a Windows Virtual Key (VK) code? (for beginners)
//!
//! Windows assigns each keyboard key a number called a "Virtual Key code".
//! These are defined in `<winuser.h>` and named `VK_*` (e.g., `VK_RETURN = 0x0D`,
//! `VK_SPACE = 0x20`).  Letters and digits use their upper-case ASCII value:
//! pressing A always produces `0x41` whatever the keyboard layout.
//!
//! The low-level keyboard hook reports exactly these codes, so they are what
//! [`InputEvent::code`](crate::InputEvent::code) carries for keyboard events.

pub const VK_BACK: u32 = 0x08;
pub const VK_TAB: u32 = 0x09;
pub const VK_RETURN: u32 = 0x0D;
pub const VK_SHIFT: u32 = 0x10;
pub const VK_CONTROL: u32 = 0x11;
pub const VK_MENU: u32 = 0x12;
pub const VK_ESCAPE: u32 = 0x1B;
pub const VK_SPACE: u32 = 0x20;
pub const VK_END: u32 = 0x23;
pub const VK_HOME: u32 = 0x24;
pub const VK_LEFT: u32 = 0x25;
pub const VK_UP: u32 = 0x26;
pub const VK_RIGHT: u32 = 0x27;
pub const VK_DOWN: u32 = 0x28;
pub const VK_DELETE: u32 = 0x2E;

// ── Function keys (VK_F1=0x70 … VK_F24=0x87) ─────────────────────────────────
pub const VK_F1: u32 = 0x70;
pub const VK_F2: u32 = 0x71;
pub const VK_F3: u32 = 0x72;
pub const VK_F4: u32 = 0x73;
pub const VK_F5: u32 = 0x74;
pub const VK_F6: u32 = 0x75;
pub const VK_F7: u32 = 0x76;
pub const VK_F8: u32 = 0x77;
pub const VK_F9: u32 = 0x78;
pub const VK_F10: u32 = 0x79;
pub const VK_F11: u32 = 0x7A;
pub const VK_F12: u32 = 0x7B;
pub const VK_F13: u32 = 0x7C;
pub const VK_F14: u32 = 0x7D;
pub const VK_F15: u32 = 0x7E;
pub const VK_F16: u32 = 0x7F;
pub const VK_F17: u32 = 0x80;
pub const VK_F18: u32 = 0x81;
pub const VK_F19: u32 = 0x82;
pub const VK_F20: u32 = 0x83;
pub const VK_F21: u32 = 0x84;
pub const VK_F22: u32 = 0x85;
pub const VK_F23: u32 = 0x86;
pub const VK_F24: u32 = 0x87;

// ── Side-specific modifiers ───────────────────────────────────────────────────
pub const VK_LSHIFT: u32 = 0xA0;
pub const VK_RSHIFT: u32 = 0xA1;
pub const VK_LCONTROL: u32 = 0xA2;
pub const VK_RCONTROL: u32 = 0xA3;

/// Named keys that are neither letters, digits nor function keys.
const NAMED_KEYS: &[(&str, u32)] = &[
    ("alt", VK_MENU),
    ("ctrl", VK_CONTROL),
    ("left ctrl", VK_LCONTROL),
    ("right ctrl", VK_RCONTROL),
    ("shift", VK_SHIFT),
    ("left shift", VK_LSHIFT),
    ("right shift", VK_RSHIFT),
    ("enter", VK_RETURN),
    ("esc", VK_ESCAPE),
    ("space", VK_SPACE),
    ("left", VK_LEFT),
    ("up", VK_UP),
    ("right", VK_RIGHT),
    ("down", VK_DOWN),
    ("end", VK_END),
    ("home", VK_HOME),
    ("delete", VK_DELETE),
];

/// Resolves a lower-case key name (without any `down`/`up` suffix) to its VK code.
pub fn name_to_vk(name: &str) -> Option<u32> {
    let bytes = name.as_bytes();
    if let [c] = bytes {
        return match c {
            b'0'..=b'9' => Some(u32::from(*c)),
            b'a'..=b'z' => Some(u32::from(c.to_ascii_uppercase())),
            _ => None,
        };
    }

    if let Some(digits) = name.strip_prefix('f') {
        let canonical = !digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit());
        if let Some(n) = digits.parse::<u32>().ok().filter(|_| canonical) {
            if (1..=12).contains(&n) {
                return Some(VK_F1 + n - 1);
            }
        }
    }

    NAMED_KEYS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|&(_, vk)| vk)
}
