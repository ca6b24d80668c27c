//! Top-level board.
//!
//! One tick drives everything: the engine computes its registered bus
//! request from the state committed last tick, then the latched board bus
//! samples that request. While an EEPROM bootstrap is in progress the
//! loader owns the bus instead and the engine is held in reset.

use log::info;
use sync_6502::Engine;
use sync_core::{BusRequest, Control, Cpu, LatchedBus, Observable, Tickable, Ticks, Value};

use crate::bus::BoardBus;
use crate::config::{BoardConfig, Bootstrap};
use crate::eeprom::{Eeprom, EepromLoader, LoaderState};
use crate::peripherals::Tone;
use crate::BoardError;

/// Loader plus the EEPROM it drains.
struct Bootloader {
    loader: EepromLoader,
    eeprom: Box<dyn Eeprom>,
}

/// The engine wired to RAM, ROM, peripherals and optional bootstrap.
pub struct Board {
    engine: Engine,
    bus: LatchedBus<BoardBus>,
    bootloader: Option<Bootloader>,
    config: BoardConfig,
    reset: bool,
    halt: bool,
    ticks: Ticks,
}

impl Board {
    /// Build a board that boots directly from ROM.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or if it asks for
    /// an EEPROM bootstrap (use [`Board::with_eeprom`]).
    pub fn new(config: BoardConfig) -> Result<Self, BoardError> {
        if matches!(config.bootstrap, Bootstrap::Eeprom { .. }) {
            return Err(BoardError::MissingEeprom);
        }
        Self::build(config, None)
    }

    /// Build a board that copies its program out of `eeprom` first.
    ///
    /// A `Direct` bootstrap in `config` is replaced by the default EEPROM
    /// bootstrap.
    pub fn with_eeprom(
        mut config: BoardConfig,
        eeprom: Box<dyn Eeprom>,
    ) -> Result<Self, BoardError> {
        if config.bootstrap == Bootstrap::Direct {
            config.bootstrap = Bootstrap::eeprom();
        }
        Self::build(config, Some(eeprom))
    }

    fn build(config: BoardConfig, eeprom: Option<Box<dyn Eeprom>>) -> Result<Self, BoardError> {
        config.validate()?;
        let bootloader = match (config.bootstrap, eeprom) {
            (Bootstrap::Eeprom { load_base, length, .. }, Some(eeprom)) => Some(Bootloader {
                loader: EepromLoader::new(load_base, length),
                eeprom,
            }),
            _ => None,
        };
        Ok(Self {
            engine: Engine::new(config.effective_engine()),
            bus: LatchedBus::new(BoardBus::new(config.memory)),
            bootloader,
            config,
            reset: false,
            halt: false,
            ticks: Ticks::ZERO,
        })
    }

    /// Advance one tick. Returns the bus request sampled this tick.
    pub fn step(&mut self) -> BusRequest {
        self.ticks += Ticks::new(1);

        if let Some(boot) = &mut self.bootloader {
            let request = boot
                .loader
                .tick(boot.eeprom.as_mut())
                .unwrap_or_default();
            let held = Control {
                data_out: self.bus.data_out(),
                reset: true,
                halt: false,
            };
            // The loader owns the bus this tick; the engine's request is dropped
            let _ = self.engine.tick(&held);
            self.bus.clock(request);
            if boot.loader.is_complete() {
                info!("bootstrap complete after {}", self.ticks);
                self.bootloader = None;
            }
            return request;
        }

        self.bus.tick_cpu(&mut self.engine, self.reset, self.halt)
    }

    /// Run up to `max_ticks` ticks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::IllegalOpcode`] as soon as the engine traps.
    pub fn run(&mut self, max_ticks: u64) -> Result<Ticks, BoardError> {
        self.run_until(max_ticks, |_| false).map(|_| Ticks::new(max_ticks))
    }

    /// Run until `done` holds after a tick, or `max_ticks` elapse.
    ///
    /// Returns the ticks taken if `done` was met, `None` on timeout.
    pub fn run_until(
        &mut self,
        max_ticks: u64,
        mut done: impl FnMut(&Self) -> bool,
    ) -> Result<Option<Ticks>, BoardError> {
        let start = self.ticks;
        for _ in 0..max_ticks {
            self.step();
            if let Some(trap) = self.engine.trap() {
                return Err(BoardError::IllegalOpcode {
                    opcode: trap.opcode,
                    address: trap.address,
                });
            }
            if done(&*self) {
                return Ok(Some(self.ticks - start));
            }
        }
        Ok(None)
    }

    /// Level-sensitive reset input.
    pub fn set_reset(&mut self, asserted: bool) {
        if asserted != self.reset {
            info!("reset {}", if asserted { "asserted" } else { "released" });
        }
        self.reset = asserted;
    }

    /// Level-sensitive halt input.
    pub fn set_halt(&mut self, asserted: bool) {
        if asserted != self.halt {
            info!("halt {}", if asserted { "asserted" } else { "released" });
        }
        self.halt = asserted;
    }

    pub fn set_buttons(&mut self, buttons: u8) {
        self.bus.inner_mut().peripherals.set_buttons(buttons);
    }

    #[must_use]
    pub fn output_port(&self) -> u8 {
        self.bus.inner().peripherals.output_port()
    }

    #[must_use]
    pub fn tone(&self) -> Tone {
        self.bus.inner().peripherals.tone()
    }

    /// Program the ROM window from its base.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), BoardError> {
        self.bus.inner_mut().rom.load(image)
    }

    /// Copy `data` into RAM at absolute `address`.
    pub fn load_ram(&mut self, address: u16, data: &[u8]) -> Result<(), BoardError> {
        let ram = self.config.memory.ram;
        let offset = ram.offset(address).ok_or(BoardError::OutsideWindow {
            what: "RAM",
            address,
        })?;
        self.bus.inner_mut().ram.load(usize::from(offset), data)
    }

    /// Side-effect-free read through the memory map.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.bus.inner().peek(address)
    }

    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub const fn ticks(&self) -> Ticks {
        self.ticks
    }

    /// True while the EEPROM bootstrap still owns the bus.
    #[must_use]
    pub const fn is_bootstrapping(&self) -> bool {
        self.bootloader.is_some()
    }

    fn loader_state(&self) -> LoaderState {
        self.bootloader
            .as_ref()
            .map_or(LoaderState::Complete, |boot| boot.loader.state())
    }
}

impl Tickable for Board {
    fn tick(&mut self) {
        self.step();
    }
}

fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

impl Observable for Board {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.engine.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|address| Value::U8(self.peek(address)))
        } else {
            match path {
                "ticks" => Some(self.ticks.get().into()),
                "buttons" => Some(self.bus.inner().peripherals.buttons().into()),
                "output_port" => Some(self.output_port().into()),
                "tone" => Some(match self.tone() {
                    Tone::Silent => 0u8.into(),
                    Tone::Note(n) | Tone::Unassigned(n) => n.into(),
                }),
                "reset" => Some(self.reset.into()),
                "halt" => Some(self.halt.into()),
                "loader.state" => Some(
                    match self.loader_state() {
                        LoaderState::Start => "Start",
                        LoaderState::Read => "Read",
                        LoaderState::Wait => "Wait",
                        LoaderState::Write => "Write",
                        LoaderState::Done => "Done",
                        LoaderState::Complete => "Complete",
                    }
                    .into(),
                ),
                _ => self.engine.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<path>",
            "memory.<address>",
            "ticks",
            "buttons",
            "output_port",
            "tone",
            "reset",
            "halt",
            "loader.state",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryMap;
    use crate::eeprom::SerialEeprom;
    use sync_6502::StateId;

    fn quick_config() -> BoardConfig {
        let mut config = BoardConfig::default();
        config.engine.startup_delay = 0;
        config
    }

    #[test]
    fn boots_from_rom_after_startup_delay() {
        let mut board = Board::new(BoardConfig::default()).unwrap();
        board.load_rom(&[0xEA]).unwrap();
        let ticks = board
            .run_until(100, |b| b.engine().state().state == StateId::FetchOpcodeRequest)
            .unwrap();
        // Reset, delay + 1 startup ticks
        assert_eq!(ticks, Some(Ticks::new(6)));
        assert_eq!(board.engine().pc(), 0xE000);

        // Counted from where this run started, not from power-on
        let ticks = board
            .run_until(100, |b| b.engine().state().state == StateId::Dispatch)
            .unwrap();
        assert_eq!(ticks, Some(Ticks::new(2)));
        assert_eq!(board.ticks(), Ticks::new(8));
    }

    #[test]
    fn new_rejects_eeprom_bootstrap() {
        let config = BoardConfig {
            bootstrap: Bootstrap::eeprom(),
            ..BoardConfig::default()
        };
        assert!(matches!(Board::new(config), Err(BoardError::MissingEeprom)));
    }

    #[test]
    fn load_ram_checks_window() {
        let mut board = Board::new(quick_config()).unwrap();
        board.load_ram(0x0010, &[1, 2, 3]).unwrap();
        assert_eq!(board.peek(0x0011), 2);
        assert!(matches!(
            board.load_ram(0x2000, &[1]),
            Err(BoardError::OutsideWindow {
                what: "RAM",
                address: 0x2000
            })
        ));
        assert!(matches!(
            board.load_ram(0x0FFF, &[1, 2]),
            Err(BoardError::ImageTooLarge { what: "RAM", .. })
        ));
    }

    #[test]
    fn trap_surfaces_as_error() {
        let mut board = Board::new(quick_config()).unwrap();
        board.load_rom(&[0xEA, 0x03]).unwrap();
        let err = board.run(100).unwrap_err();
        assert!(matches!(
            err,
            BoardError::IllegalOpcode {
                opcode: 0x03,
                address: 0xE001
            }
        ));
    }

    #[test]
    fn eeprom_bootstrap_holds_engine_in_reset() {
        let program = vec![0xA9, 0x07, 0x8D, 0x01, 0xD0]; // LDA #7; STA $D001
        let config = BoardConfig {
            bootstrap: Bootstrap::Eeprom {
                load_base: 0x0200,
                length: program.len() as u16,
                latency: 1,
            },
            memory: MemoryMap::default(),
            ..quick_config()
        };
        let mut board =
            Board::with_eeprom(config, Box::new(SerialEeprom::new(program.clone(), 1))).unwrap();

        while board.is_bootstrapping() {
            board.step();
            assert_eq!(board.engine().state().state, StateId::Reset);
        }
        for (i, byte) in program.iter().enumerate() {
            assert_eq!(board.peek(0x0200 + i as u16), *byte);
        }

        board.run(40).unwrap();
        assert_eq!(board.output_port(), 0x07);
    }

    #[test]
    fn observable_memory_paths() {
        let mut board = Board::new(quick_config()).unwrap();
        board.load_ram(0x0042, &[0x99]).unwrap();
        assert_eq!(board.query("memory.0x0042"), Some(Value::U8(0x99)));
        assert_eq!(board.query("memory.$42"), Some(Value::U8(0x99)));
        assert_eq!(board.query("memory.66"), Some(Value::U8(0x99)));
        assert_eq!(board.query("cpu.sp"), Some(Value::U8(0x3F)));
        assert_eq!(board.query("loader.state"), Some(Value::Text("Complete")));
    }
}
