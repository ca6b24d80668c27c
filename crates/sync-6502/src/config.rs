//! Engine configuration.

/// Reset-time constants of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct EngineConfig {
    /// Stack pointer loaded on reset.
    pub reset_sp: u8,
    /// Program counter loaded once the startup delay has elapsed.
    pub boot_vector: u16,
    /// Ticks spent in `StartupDelay` before the first opcode fetch.
    pub startup_delay: u8,
}

impl EngineConfig {
    pub const DEFAULT_RESET_SP: u8 = 0x3F;
    pub const DEFAULT_BOOT_VECTOR: u16 = 0xE000;
    pub const DEFAULT_STARTUP_DELAY: u8 = 4;
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reset_sp: Self::DEFAULT_RESET_SP,
            boot_vector: Self::DEFAULT_BOOT_VECTOR,
            startup_delay: Self::DEFAULT_STARTUP_DELAY,
        }
    }
}
