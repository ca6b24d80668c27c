//! Board configuration.
//!
//! Every field has a default, so a JSON file only needs the settings it
//! changes:
//!
//! ```json
//! {
//!     "engine": { "startup_delay": 0 },
//!     "bootstrap": { "kind": "eeprom", "load_base": 512 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use sync_6502::EngineConfig;

use crate::BoardError;

/// One contiguous address window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Window {
    pub base: u16,
    /// Size in bytes. Up to `0x10000`.
    pub size: u32,
}

impl Window {
    #[must_use]
    pub const fn new(base: u16, size: u32) -> Self {
        Self { base, size }
    }

    /// One past the last address. Saturates for oversized windows.
    #[must_use]
    pub const fn end(self) -> u32 {
        (self.base as u32).saturating_add(self.size)
    }

    /// Offset of `address` into the window, if it falls inside.
    #[must_use]
    pub const fn offset(self, address: u16) -> Option<u16> {
        let offset = address.wrapping_sub(self.base);
        if address >= self.base && (offset as u32) < self.size {
            Some(offset)
        } else {
            None
        }
    }

    const fn overlaps(self, other: Self) -> bool {
        (self.base as u32) < other.end() && (other.base as u32) < self.end()
    }
}

/// Address ranges owned by each device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryMap {
    pub ram: Window,
    pub peripherals: Window,
    pub rom: Window,
}

impl MemoryMap {
    pub const DEFAULT_RAM: Window = Window::new(0x0000, 0x1000);
    pub const DEFAULT_PERIPHERALS: Window = Window::new(0xD000, 0x0100);
    pub const DEFAULT_ROM: Window = Window::new(0xE000, 0x2000);

    /// Check every window is non-empty, inside 64 KiB and disjoint.
    pub fn validate(&self) -> Result<(), BoardError> {
        let windows = [
            ("RAM", self.ram),
            ("peripheral", self.peripherals),
            ("ROM", self.rom),
        ];
        for (name, window) in windows {
            if window.size == 0 {
                return Err(BoardError::EmptyWindow(name));
            }
            if window.size > 0x1_0000 || window.end() > 0x1_0000 {
                return Err(BoardError::WindowOutOfRange(name));
            }
        }
        for (i, &(first, a)) in windows.iter().enumerate() {
            for &(second, b) in &windows[i + 1..] {
                if a.overlaps(b) {
                    return Err(BoardError::OverlappingWindows { first, second });
                }
            }
        }
        Ok(())
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self {
            ram: Self::DEFAULT_RAM,
            peripherals: Self::DEFAULT_PERIPHERALS,
            rom: Self::DEFAULT_ROM,
        }
    }
}

/// How the program reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bootstrap {
    /// Execute straight from ROM at the boot vector.
    #[default]
    Direct,
    /// Copy `length` bytes from a serial EEPROM into RAM at `load_base`,
    /// then boot from `load_base`.
    Eeprom {
        #[serde(default = "default_load_base")]
        load_base: u16,
        #[serde(default = "default_length")]
        length: u16,
        /// Ticks the EEPROM takes per byte.
        #[serde(default = "default_latency")]
        latency: u8,
    },
}

const fn default_load_base() -> u16 {
    0x0200
}

const fn default_length() -> u16 {
    256
}

const fn default_latency() -> u8 {
    2
}

impl Bootstrap {
    /// EEPROM bootstrap with default parameters.
    #[must_use]
    pub const fn eeprom() -> Self {
        Self::Eeprom {
            load_base: default_load_base(),
            length: default_length(),
            latency: default_latency(),
        }
    }

    /// Per-byte EEPROM transfer time, or the default for `Direct`.
    #[must_use]
    pub const fn latency(&self) -> u8 {
        match self {
            Self::Eeprom { latency, .. } => *latency,
            Self::Direct => default_latency(),
        }
    }
}

/// Complete board configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub engine: EngineConfig,
    pub memory: MemoryMap,
    pub bootstrap: Bootstrap,
}

impl BoardConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, BoardError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BoardError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        self.memory.validate()?;
        if let Bootstrap::Eeprom {
            load_base, length, ..
        } = self.bootstrap
        {
            let fits = self.memory.ram.offset(load_base).is_some()
                && u32::from(load_base) + u32::from(length) <= self.memory.ram.end();
            if !fits {
                return Err(BoardError::LoadOutsideRam {
                    base: load_base,
                    length,
                });
            }
        }
        Ok(())
    }

    /// Engine settings after bootstrap adjustments.
    #[must_use]
    pub const fn effective_engine(&self) -> EngineConfig {
        match self.bootstrap {
            Bootstrap::Direct => self.engine,
            Bootstrap::Eeprom { load_base, .. } => EngineConfig {
                boot_vector: load_base,
                ..self.engine
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_is_valid() {
        assert!(BoardConfig::default().validate().is_ok());
    }

    #[test]
    fn window_offsets() {
        let w = Window::new(0xD000, 0x100);
        assert_eq!(w.offset(0xD000), Some(0));
        assert_eq!(w.offset(0xD0FF), Some(0xFF));
        assert_eq!(w.offset(0xD100), None);
        assert_eq!(w.offset(0xCFFF), None);

        let top = Window::new(0xE000, 0x2000);
        assert_eq!(top.offset(0xFFFF), Some(0x1FFF));
    }

    #[test]
    fn overlapping_windows_rejected() {
        let mut map = MemoryMap::default();
        map.rom = Window::new(0x0800, 0x1000);
        assert!(matches!(
            map.validate(),
            Err(BoardError::OverlappingWindows {
                first: "RAM",
                second: "ROM"
            })
        ));
    }

    #[test]
    fn empty_and_oversized_windows_rejected() {
        let mut map = MemoryMap::default();
        map.ram.size = 0;
        assert!(matches!(map.validate(), Err(BoardError::EmptyWindow("RAM"))));

        let mut map = MemoryMap::default();
        map.rom.size = 0x2001;
        assert!(matches!(
            map.validate(),
            Err(BoardError::WindowOutOfRange("ROM"))
        ));
    }

    #[test]
    fn huge_window_size_is_an_error() {
        let result = BoardConfig::from_json(
            r#"{ "memory": { "ram": { "base": 1, "size": 4294967295 } } }"#,
        );
        assert!(matches!(result, Err(BoardError::WindowOutOfRange("RAM"))));

        let top = Window::new(0xFFFF, u32::MAX);
        assert_eq!(top.end(), u32::MAX);
    }

    #[test]
    fn eeprom_bootstrap_moves_boot_vector() {
        let config = BoardConfig {
            bootstrap: Bootstrap::eeprom(),
            ..BoardConfig::default()
        };
        assert_eq!(config.effective_engine().boot_vector, 0x0200);
        assert_eq!(BoardConfig::default().effective_engine().boot_vector, 0xE000);
    }

    #[test]
    fn eeprom_load_must_fit_in_ram() {
        let config = BoardConfig {
            bootstrap: Bootstrap::Eeprom {
                load_base: 0x0F80,
                length: 256,
                latency: 0,
            },
            ..BoardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BoardError::LoadOutsideRam { base: 0x0F80, .. })
        ));
    }
}
