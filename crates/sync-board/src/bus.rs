//! Board bus: address routing.
//!
//! Implements `sync_core::Bus` for the board. Routes addresses to RAM,
//! the peripheral registers and ROM according to the [`MemoryMap`].
//! Unmapped reads return 0; writes to ROM or unmapped space are dropped.

use log::trace;
use sync_core::Bus;

use crate::config::MemoryMap;
use crate::memory::{Ram, Rom};
use crate::peripherals::Peripherals;

/// Device ownership of one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Ram(usize),
    Peripheral(u16),
    Rom(usize),
    Unmapped,
}

/// The board's combinational memory system.
#[derive(Debug, Clone)]
pub struct BoardBus {
    map: MemoryMap,
    pub ram: Ram,
    pub rom: Rom,
    pub peripherals: Peripherals,
}

impl BoardBus {
    /// Empty RAM, erased ROM, idle peripherals. `map` must be valid.
    #[must_use]
    pub fn new(map: MemoryMap) -> Self {
        Self {
            map,
            ram: Ram::new(map.ram.size as usize),
            rom: Rom::new(map.rom.size as usize),
            peripherals: Peripherals::new(),
        }
    }

    #[must_use]
    pub const fn map(&self) -> &MemoryMap {
        &self.map
    }

    fn decode(&self, address: u16) -> Target {
        if let Some(offset) = self.map.ram.offset(address) {
            Target::Ram(offset as usize)
        } else if let Some(offset) = self.map.peripherals.offset(address) {
            Target::Peripheral(offset)
        } else if let Some(offset) = self.map.rom.offset(address) {
            Target::Rom(offset as usize)
        } else {
            Target::Unmapped
        }
    }

    /// Read without going through the bus (for observation).
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        match self.decode(address) {
            Target::Ram(offset) => self.ram.read(offset),
            Target::Peripheral(offset) => self.peripherals.read(offset),
            Target::Rom(offset) => self.rom.read(offset),
            Target::Unmapped => 0,
        }
    }
}

impl Bus for BoardBus {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        match self.decode(address) {
            Target::Ram(offset) => self.ram.write(offset, value),
            Target::Peripheral(offset) => self.peripherals.write(offset, value),
            Target::Rom(_) => trace!("write ${value:02X} to ROM at ${address:04X} ignored"),
            Target::Unmapped => trace!("write ${value:02X} to unmapped ${address:04X} ignored"),
        }
    }
}
