//! CPU core trait.

use crate::{BusRequest, Control};

/// A tick-synchronous CPU core.
///
/// Unlike a CPU that calls into its bus, this core never touches memory
/// directly: each tick it consumes the previous tick's bus response (in
/// [`Control`]) and returns the registered request for the bus to sample.
/// That keeps bus timing fully visible to whoever drives the clock.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Advance the CPU by one tick.
    fn tick(&mut self, control: &Control) -> BusRequest;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true while the CPU is parked by the halt input.
    fn is_halted(&self) -> bool;

    /// Returns true once the CPU has trapped and needs a reset to leave.
    fn is_trapped(&self) -> bool;

    /// Reset the CPU to its power-up state.
    fn reset(&mut self);
}
