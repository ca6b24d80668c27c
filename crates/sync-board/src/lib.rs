//! Reference board for the sync-6502 engine.
//!
//! Memory map (defaults, see [`MemoryMap`]):
//!
//! | Range           | Device                         |
//! |-----------------|--------------------------------|
//! | `$0000-$0FFF`   | RAM (stack lives at `$00-$FF`) |
//! | `$D000-$D0FF`   | Peripheral registers           |
//! | `$E000-$FFFF`   | ROM                            |

mod board;
mod bus;
mod config;
mod eeprom;
mod error;
mod memory;
mod peripherals;

pub use board::Board;
pub use bus::BoardBus;
pub use config::{BoardConfig, Bootstrap, MemoryMap, Window};
pub use eeprom::{Eeprom, EepromLoader, LoaderState, SerialEeprom};
pub use error::BoardError;
pub use memory::{Ram, Rom};
pub use peripherals::{Peripherals, Tone};
