//! Memory-mapped peripheral registers.
//!
//! | Offset | Register    | Access     |
//! |--------|-------------|------------|
//! | +0     | Buttons     | read-only  |
//! | +1     | Output port | write-only |
//! | +2     | Tone select | write-only |
//!
//! Everything else in the window reads as 0 and ignores writes.

use std::fmt;

use log::debug;

pub const BUTTONS: u16 = 0;
pub const OUTPUT_PORT: u16 = 1;
pub const TONE: u16 = 2;

/// Lowest and highest note numbers the tone generator plays.
pub const LOWEST_NOTE: u8 = 60;
pub const HIGHEST_NOTE: u8 = 96;

/// Decoded tone-select register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Silent,
    /// Note number, `60..=96`. 69 is A4 (440 Hz).
    Note(u8),
    /// Stored but produces no sound.
    Unassigned(u8),
}

impl Tone {
    #[must_use]
    pub const fn from_register(value: u8) -> Self {
        match value {
            0 => Self::Silent,
            LOWEST_NOTE..=HIGHEST_NOTE => Self::Note(value),
            _ => Self::Unassigned(value),
        }
    }

    /// Equal-temperament frequency of a playable note.
    #[must_use]
    pub fn frequency_hz(self) -> Option<f64> {
        match self {
            Self::Note(n) => Some(440.0 * 2f64.powf((f64::from(n) - 69.0) / 12.0)),
            Self::Silent | Self::Unassigned(_) => None,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Silent => write!(f, "silent"),
            Self::Note(n) => write!(f, "note {n} ({:.2} Hz)", self.frequency_hz().unwrap_or(0.0)),
            Self::Unassigned(n) => write!(f, "unassigned ({n})"),
        }
    }
}

/// Button input, output latch and tone register.
#[derive(Debug, Clone, Default)]
pub struct Peripherals {
    buttons: u8,
    output_port: u8,
    tone: u8,
}

impl Peripherals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus read at `offset` into the window.
    #[must_use]
    pub const fn read(&self, offset: u16) -> u8 {
        match offset {
            BUTTONS => self.buttons,
            _ => 0,
        }
    }

    /// Bus write at `offset` into the window.
    pub fn write(&mut self, offset: u16, value: u8) {
        match offset {
            OUTPUT_PORT => self.output_port = value,
            TONE => {
                if value != self.tone {
                    debug!("tone: {}", Tone::from_register(value));
                }
                self.tone = value;
            }
            _ => {}
        }
    }

    /// Drive the button inputs (one bit per button, 1 = pressed).
    pub fn set_buttons(&mut self, buttons: u8) {
        self.buttons = buttons;
    }

    #[must_use]
    pub const fn buttons(&self) -> u8 {
        self.buttons
    }

    #[must_use]
    pub const fn output_port(&self) -> u8 {
        self.output_port
    }

    #[must_use]
    pub const fn tone(&self) -> Tone {
        Tone::from_register(self.tone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_decoding() {
        assert_eq!(Tone::from_register(0), Tone::Silent);
        assert_eq!(Tone::from_register(60), Tone::Note(60));
        assert_eq!(Tone::from_register(96), Tone::Note(96));
        assert_eq!(Tone::from_register(59), Tone::Unassigned(59));
        assert_eq!(Tone::from_register(97), Tone::Unassigned(97));
    }

    #[test]
    fn note_frequencies() {
        let a4 = Tone::Note(69).frequency_hz().unwrap();
        assert!((a4 - 440.0).abs() < 1e-9);
        let a5 = Tone::Note(81).frequency_hz().unwrap();
        assert!((a5 - 880.0).abs() < 1e-9);
        assert_eq!(Tone::Silent.frequency_hz(), None);
    }

    #[test]
    fn write_only_registers_read_zero() {
        let mut p = Peripherals::new();
        p.write(OUTPUT_PORT, 0x5A);
        p.write(TONE, 69);
        assert_eq!(p.read(OUTPUT_PORT), 0);
        assert_eq!(p.read(TONE), 0);
        assert_eq!(p.output_port(), 0x5A);
        assert_eq!(p.tone(), Tone::Note(69));
    }

    #[test]
    fn buttons_are_read_only() {
        let mut p = Peripherals::new();
        p.set_buttons(0b0000_0101);
        p.write(BUTTONS, 0xFF);
        assert_eq!(p.read(BUTTONS), 0b0000_0101);
    }
}
