//! Whole-system clocking.

use crate::Ticks;

/// Something that owns all of its inputs and can be clocked on its own.
///
/// Boards implement this. A bare CPU does not: it needs a bus response
/// and control lines each tick, so it is driven through
/// [`crate::LatchedBus::tick_cpu`] instead.
pub trait Tickable {
    /// One synchronous evaluation.
    fn tick(&mut self);

    /// `count` evaluations, indistinguishable from calling `tick` that
    /// many times.
    fn tick_n(&mut self, count: Ticks) {
        (0..count.get()).for_each(|_| self.tick());
    }
}
