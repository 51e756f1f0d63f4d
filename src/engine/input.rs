//! # Input events delivered by the external event source.
//!
//! [`InputEvent`] is the tagged union consumed by the observer controller.
//! Key codes follow the USB HID / SDL scancode numbering, see [`keys`].
//!
//! Events also parse from a one-line text form, used by the headless demo:
//! ```text
//! exit
//! key 30 down
//! key 30 up
//! mouse 10 -5
//! ```

use std::str::FromStr;

use thiserror::Error;

/// Scancodes recognised by the observer controller.
pub mod keys {
    /// `C`: default collision toggle.
    pub const C: u32 = 6;
    /// Digit `1`; digits `1..=9` are contiguous.
    pub const DIGIT_1: u32 = 30;
    /// Digit `9`.
    pub const DIGIT_9: u32 = 38;
    /// Digit `0` (follows `9`).
    pub const DIGIT_0: u32 = 39;
    /// Escape.
    pub const ESCAPE: u32 = 41;
}

/// A single input event. Each one is consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Window closed / quit requested.
    Exit,
    /// Key transition.
    Key { code: u32, is_down: bool },
    /// Relative pointer motion.
    MouseMove { dx: f64, dy: f64 },
}

impl InputEvent {
    /// Key-down shorthand.
    pub fn key_down(code: u32) -> Self {
        InputEvent::Key { code, is_down: true }
    }

    /// Key-up shorthand.
    pub fn key_up(code: u32) -> Self {
        InputEvent::Key {
            code,
            is_down: false,
        }
    }
}

/// Failure to parse the text form of an [`InputEvent`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("empty event line")]
    Empty,
    #[error("unknown event `{0}`")]
    UnknownKind(String),
    #[error("malformed `{kind}` event: {line}")]
    Malformed { kind: &'static str, line: String },
}

impl FromStr for InputEvent {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let kind = words.next().ok_or(ParseEventError::Empty)?;
        let malformed = |kind: &'static str| ParseEventError::Malformed {
            kind,
            line: s.trim().to_string(),
        };

        let event = match kind {
            "exit" => InputEvent::Exit,
            "key" => {
                let code = words
                    .next()
                    .and_then(|w| w.parse::<u32>().ok())
                    .ok_or_else(|| malformed("key"))?;
                let is_down = match words.next() {
                    Some("down") | None => true,
                    Some("up") => false,
                    Some(_) => return Err(malformed("key")),
                };
                InputEvent::Key { code, is_down }
            }
            "mouse" => {
                let mut axis = || words.next().and_then(|w| w.parse::<f64>().ok());
                match (axis(), axis()) {
                    (Some(dx), Some(dy)) => InputEvent::MouseMove { dx, dy },
                    _ => return Err(malformed("mouse")),
                }
            }
            other => return Err(ParseEventError::UnknownKind(other.to_string())),
        };

        if words.next().is_some() {
            return Err(malformed(match event {
                InputEvent::Exit => "exit",
                InputEvent::Key { .. } => "key",
                InputEvent::MouseMove { .. } => "mouse",
            }));
        }
        Ok(event)
    }
}
