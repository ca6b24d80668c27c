//! Memory bus interfaces.
//!
//! Two layers: [`Bus`] is the combinational view a device map exposes
//! (address in, byte out, right now). [`LatchedBus`] wraps it into the
//! registered request/response contract a processor sees: one request is
//! sampled per tick and a read answers one tick later.

use crate::{Control, Cpu};

/// Combinational device access.
///
/// RAM, ROM and peripheral maps implement this. The bus handles address
/// decoding and routing to the owning device.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// A single bus transaction, sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusRequest {
    /// Address driven by the requester.
    pub address: u16,
    /// Byte driven towards the bus (only meaningful with `write_enable`).
    pub data_in: u8,
    /// Write strobe. When clear the request is a read.
    pub write_enable: bool,
}

impl BusRequest {
    /// A read request for `address`.
    #[must_use]
    pub const fn read(address: u16) -> Self {
        Self {
            address,
            data_in: 0,
            write_enable: false,
        }
    }

    /// A write request storing `data` at `address`.
    #[must_use]
    pub const fn write(address: u16, data: u8) -> Self {
        Self {
            address,
            data_in: data,
            write_enable: true,
        }
    }

    /// The same request with the write strobe released.
    #[must_use]
    pub const fn released(self) -> Self {
        Self {
            write_enable: false,
            ..self
        }
    }
}

/// Registered bus with one tick of read latency.
///
/// `data_out` is a register: the value seen during tick N is whatever
/// address was requested during tick N-1.
#[derive(Debug)]
pub struct LatchedBus<B> {
    inner: B,
    data_out: u8,
}

impl<B: Bus> LatchedBus<B> {
    #[must_use]
    pub const fn new(inner: B) -> Self {
        Self { inner, data_out: 0 }
    }

    /// Byte presented to the requester this tick.
    #[must_use]
    pub const fn data_out(&self) -> u8 {
        self.data_out
    }

    /// Sample `request` at the end of a tick.
    ///
    /// A write lands first, so a write request latches the stored value.
    pub fn clock(&mut self, request: BusRequest) {
        if request.write_enable {
            self.inner.write(request.address, request.data_in);
        }
        self.data_out = self.inner.read(request.address);
    }

    /// Run one synchronous tick of `cpu` against this bus.
    ///
    /// Returns the request the CPU drove, so callers can snoop the bus.
    pub fn tick_cpu<C: Cpu>(&mut self, cpu: &mut C, reset: bool, halt: bool) -> BusRequest {
        let control = Control {
            data_out: self.data_out,
            reset,
            halt,
        };
        let request = cpu.tick(&control);
        self.clock(request);
        request
    }

    #[must_use]
    pub const fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }
}

/// Flat 64 KiB RAM, for tests and bare-metal harnesses.
#[derive(Debug, Clone)]
pub struct SimpleBus {
    memory: Vec<u8>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x1_0000],
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at 64 KiB.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            let target = address.wrapping_add(offset as u16);
            self.memory[usize::from(target)] = byte;
        }
    }

    /// Read without going through the bus.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }
}
