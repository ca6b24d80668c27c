//! Serial EEPROM collaborator and the bootstrap loader that drains it.
//!
//! The loader runs before the engine leaves reset. Each byte takes one
//! `Read → Wait → Write → Done` loop: strobe the EEPROM with the serial
//! offset, wait for its one-tick `ready` pulse, then write the byte to RAM
//! through the ordinary bus request contract.

use log::{debug, info};
use sync_core::BusRequest;

/// Byte-wide view of a serial EEPROM. Clocked once per tick.
pub trait Eeprom {
    /// Advance one tick. A `strobe` while idle starts a transfer of the
    /// byte at serial offset `address`.
    fn clock(&mut self, address: u16, strobe: bool);

    /// Last byte transferred.
    fn data_out(&self) -> u8;

    /// High for exactly one tick when a transfer completes.
    fn ready(&self) -> bool;
}

/// In-memory EEPROM image with a fixed per-byte transfer time.
///
/// Offsets past the end of the image read as `0xFF` (erased).
#[derive(Debug, Clone)]
pub struct SerialEeprom {
    image: Vec<u8>,
    latency: u8,
    address: u16,
    /// Ticks left in the transfer in progress.
    pending: Option<u8>,
    data_out: u8,
    ready: bool,
}

impl SerialEeprom {
    #[must_use]
    pub const fn new(image: Vec<u8>, latency: u8) -> Self {
        Self {
            image,
            latency,
            address: 0,
            pending: None,
            data_out: 0xFF,
            ready: false,
        }
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

impl Eeprom for SerialEeprom {
    fn clock(&mut self, address: u16, strobe: bool) {
        self.ready = false;
        match self.pending {
            Some(0) => {
                self.data_out = self
                    .image
                    .get(usize::from(self.address))
                    .copied()
                    .unwrap_or(0xFF);
                self.ready = true;
                self.pending = None;
            }
            Some(n) => self.pending = Some(n - 1),
            None if strobe => {
                self.address = address;
                self.pending = Some(self.latency);
            }
            None => {}
        }
    }

    fn data_out(&self) -> u8 {
        self.data_out
    }

    fn ready(&self) -> bool {
        self.ready
    }
}

/// Loader FSM state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Start,
    /// Strobe the EEPROM for the current byte.
    Read,
    /// Wait for `ready`.
    Wait,
    /// Drive the RAM write.
    Write,
    /// Advance, or finish after the last byte.
    Done,
    /// All bytes copied. The engine may run.
    Complete,
}

/// Copies `length` EEPROM bytes into RAM at `load_base`.
#[derive(Debug, Clone)]
pub struct EepromLoader {
    state: LoaderState,
    load_base: u16,
    length: u16,
    index: u16,
    byte: u8,
}

impl EepromLoader {
    #[must_use]
    pub const fn new(load_base: u16, length: u16) -> Self {
        Self {
            state: LoaderState::Start,
            load_base,
            length,
            index: 0,
            byte: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> LoaderState {
        self.state
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == LoaderState::Complete
    }

    /// Bytes copied so far.
    #[must_use]
    pub const fn loaded(&self) -> u16 {
        self.index
    }

    /// One tick. Returns the bus request the loader drives, if any.
    pub fn tick(&mut self, eeprom: &mut dyn Eeprom) -> Option<BusRequest> {
        match self.state {
            LoaderState::Start => {
                info!(
                    "EEPROM bootstrap: loading {} bytes to ${:04X}",
                    self.length, self.load_base
                );
                eeprom.clock(0, false);
                self.index = 0;
                self.state = if self.length == 0 {
                    LoaderState::Complete
                } else {
                    LoaderState::Read
                };
                None
            }
            LoaderState::Read => {
                eeprom.clock(self.index, true);
                self.state = LoaderState::Wait;
                None
            }
            LoaderState::Wait => {
                eeprom.clock(self.index, false);
                if eeprom.ready() {
                    self.byte = eeprom.data_out();
                    self.state = LoaderState::Write;
                }
                None
            }
            LoaderState::Write => {
                eeprom.clock(self.index, false);
                self.state = LoaderState::Done;
                Some(BusRequest::write(
                    self.load_base.wrapping_add(self.index),
                    self.byte,
                ))
            }
            LoaderState::Done => {
                eeprom.clock(self.index, false);
                self.index += 1;
                if self.index >= self.length {
                    debug!("EEPROM bootstrap: {} bytes loaded", self.index);
                    self.state = LoaderState::Complete;
                } else {
                    self.state = LoaderState::Read;
                }
                None
            }
            LoaderState::Complete => None,
        }
    }
}
