//! # Speed selected by the digit `0` key.
//!
//! Digits `1..=9` map to speeds `1..=9`. Digit `0` either stops the observer
//! or selects the top speed, depending on [`ZeroKeySpeed`].

/// Meaning of digit `0` for observer speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZeroKeySpeed {
    /// `0` sets speed 0.
    Stop,
    /// `0` sets speed 10, one above digit `9`.
    Full,
}

impl ZeroKeySpeed {
    /// Speed applied on digit `0` key-down.
    #[inline]
    pub fn speed(&self) -> u8 {
        match self {
            ZeroKeySpeed::Stop => 0,
            ZeroKeySpeed::Full => 10,
        }
    }
}

impl Default for ZeroKeySpeed {
    /// Returns [`ZeroKeySpeed::Stop`].
    fn default() -> Self {
        ZeroKeySpeed::Stop
    }
}
