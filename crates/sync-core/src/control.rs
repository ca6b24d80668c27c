//! Per-tick processor inputs.

/// Inputs sampled by a processor at the start of every tick.
///
/// `reset` and `halt` are level-sensitive. Reset takes priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Control {
    /// Bus response to the request issued on the previous tick.
    pub data_out: u8,
    /// Hard restart; overrides any in-flight sequence.
    pub reset: bool,
    /// Pause request, honoured at the next instruction boundary.
    pub halt: bool,
}

impl Control {
    /// Inputs with both control lines released.
    #[must_use]
    pub const fn running(data_out: u8) -> Self {
        Self {
            data_out,
            reset: false,
            halt: false,
        }
    }
}
