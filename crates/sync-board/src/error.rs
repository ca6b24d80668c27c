//! Board error type.

use thiserror::Error;

/// Everything that can go wrong building or running a board.
///
/// The engine itself never fails; an illegal opcode parks it in
/// `ErrorTrap`, which the board surfaces here when a run loop sees it.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("illegal opcode ${opcode:02X} at ${address:04X}")]
    IllegalOpcode { opcode: u8, address: u16 },

    #[error("{what} image is {len} bytes, larger than the {capacity}-byte window")]
    ImageTooLarge {
        what: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error("${address:04X} is outside the {what} window")]
    OutsideWindow { what: &'static str, address: u16 },

    #[error("{first} window overlaps {second} window")]
    OverlappingWindows {
        first: &'static str,
        second: &'static str,
    },

    #[error("{0} window is empty")]
    EmptyWindow(&'static str),

    #[error("{0} window extends past $FFFF")]
    WindowOutOfRange(&'static str),

    #[error("EEPROM load of {length} bytes at ${base:04X} does not fit in RAM")]
    LoadOutsideRam { base: u16, length: u16 },

    #[error("EEPROM bootstrap configured but no EEPROM attached")]
    MissingEeprom,

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
