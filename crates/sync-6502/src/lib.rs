//! Tick-synchronous 6502-compatible instruction engine.
//!
//! Every tick the engine reads the state committed on the previous tick
//! and the bus byte requested on the previous tick, and produces the next
//! state plus one registered bus request. A read issued in tick N is
//! answered in tick N+1, so every bus access costs a request tick and a
//! capture tick.
//!
//! Differences from a stock 6502: no interrupts, no decimal arithmetic,
//! the stack lives in page zero, and opcodes with `cc = 11` trap.

pub mod alu;
mod config;
pub mod decode;
mod engine;
pub mod flags;
mod registers;
mod state;

pub use config::EngineConfig;
pub use decode::{AddressMode, Op, Opcode, decode};
pub use engine::{Engine, Trap, transition};
pub use flags::Flags;
pub use registers::Registers;
pub use state::{CpuState, StateId};
