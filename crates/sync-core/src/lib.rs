//! Core traits and types for tick-synchronous processor models.
//!
//! One logical clock drives everything. Each tick, a component reads the
//! snapshot committed at the end of the previous tick and produces the
//! values that become visible at the start of the next one.

mod bus;
mod control;
mod cpu;
mod observable;
mod tickable;
mod ticks;

pub use bus::{Bus, BusRequest, LatchedBus, SimpleBus};
pub use control::Control;
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
