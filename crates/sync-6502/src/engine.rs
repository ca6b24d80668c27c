//! The tick-synchronous execution engine.
//!
//! [`transition`] is the whole machine: a pure function from the state
//! committed at the end of the previous tick, plus this tick's inputs, to
//! the next state and the registered bus outputs. It reads only the
//! snapshot it is given and writes only the value it returns, so every
//! assignment within a tick takes effect together at the tick boundary.
//!
//! Instruction sequences, in ticks after `FetchOpcodeRequest`:
//!
//! - Implied / accumulator: capture, dispatch, execute, writeback
//! - Immediate: + operand request and capture
//! - Zero page / absolute: + one or two address bytes, then a memory read
//! - Indexed indirect `(zp,X)` / indirect indexed `(zp),Y`: + pointer reads
//! - Stores finish with a write request and a strobe release
//!
//! Every bus transaction costs exactly two ticks.

use log::{debug, trace, warn};
use sync_core::{BusRequest, Control, Cpu, Observable, Value};

use crate::alu::{self, CARRY_OUT};
use crate::decode::{AddressMode, BranchFlag, Op, decode};
use crate::state::{CpuState, StateId};
use crate::{EngineConfig, Registers};

/// An illegal opcode that parked the engine in `ErrorTrap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trap {
    pub opcode: u8,
    /// Address the opcode was fetched from.
    pub address: u16,
}

/// One tick of the engine.
///
/// Returns the next state and the bus request it drives. The request is
/// also stored in `CpuState::bus`: outputs are registered, so they hold
/// until a later state changes them. The write strobe is the exception,
/// dropping after one tick unless reasserted.
#[must_use]
pub fn transition(
    current: &CpuState,
    control: &Control,
    config: &EngineConfig,
) -> (CpuState, BusRequest) {
    if control.reset {
        let next = CpuState::reset(config);
        return (next, next.bus);
    }

    let mut next = *current;
    next.bus = current.bus.released();

    let regs = &current.regs;
    let data = control.data_out;

    match current.state {
        StateId::Reset => {
            next.delay = config.startup_delay;
            next.state = StateId::StartupDelay;
        }
        StateId::StartupDelay => {
            if current.delay == 0 {
                next.regs.pc = config.boot_vector;
                next.state = StateId::FetchOpcodeRequest;
            } else {
                next.delay = current.delay - 1;
            }
        }

        StateId::FetchOpcodeRequest => {
            next.address_mode = AddressMode::None;
            if control.halt {
                next.regs.p.break_ = true;
                next.state = StateId::Halted;
            } else {
                next.bus = BusRequest::read(regs.pc);
                next.state = StateId::FetchOpcodeCapture;
            }
        }
        StateId::FetchOpcodeCapture => {
            next.instruction = data;
            next.regs.pc = regs.pc.wrapping_add(1);
            next.state = StateId::Dispatch;
        }
        StateId::Dispatch => dispatch(current, &mut next),

        StateId::FetchOperandRequest => {
            next.bus = BusRequest::read(regs.pc);
            next.state = StateId::FetchOperandCapture;
        }
        StateId::FetchOperandCapture => capture_operand(current, data, &mut next),
        StateId::FetchAddressHighRequest => {
            next.bus = BusRequest::read(regs.pc);
            next.state = StateId::FetchAddressHighCapture;
        }
        StateId::FetchAddressHighCapture => capture_address_high(current, data, &mut next),

        StateId::ReadPointerLowRequest => {
            next.bus = BusRequest::read(current.effective_address);
            next.state = StateId::ReadPointerLowCapture;
        }
        StateId::ReadPointerLowCapture => {
            next.operand = u16::from(data);
            next.state = StateId::ReadPointerHighRequest;
        }
        StateId::ReadPointerHighRequest => {
            next.bus = BusRequest::read(pointer_high(current));
            next.state = StateId::ReadPointerHighCapture;
        }
        StateId::ReadPointerHighCapture => capture_pointer_high(current, data, &mut next),

        StateId::ReadOperandRequest => {
            next.bus = BusRequest::read(current.effective_address);
            next.state = StateId::ReadOperandCapture;
        }
        StateId::ReadOperandCapture => {
            next.operand = u16::from(data);
            next.state = StateId::Execute;
        }

        StateId::Execute => execute(current, &mut next),
        StateId::WritebackA
        | StateId::WritebackX
        | StateId::WritebackY
        | StateId::WritebackFlags => writeback(current, &mut next),

        StateId::StoreOperandRequest => {
            let op = decode(current.instruction).op;
            let value = match op {
                Op::Sta => regs.a,
                Op::Stx => regs.x,
                Op::Sty => regs.y,
                _ => current.operand as u8,
            };
            if op.is_shift() {
                next.regs.p.update_nz(value);
                next.regs.p.carry = current.operand & CARRY_OUT != 0;
            }
            next.bus = BusRequest::write(current.effective_address, value);
            next.state = StateId::StoreOperandFinish;
        }

        StateId::Push => {
            let value = match decode(current.instruction).op {
                Op::Php => regs.p.to_byte(),
                _ => regs.a,
            };
            let address = next.regs.push();
            next.bus = BusRequest::write(address, value);
            next.state = StateId::FinishPush;
        }
        StateId::Pop => {
            let address = next.regs.pop();
            next.bus = BusRequest::read(address);
            next.state = StateId::FinishPop;
        }
        StateId::FinishPop => {
            if decode(current.instruction).op == Op::Plp {
                next.regs.p = regs.p.restored(data);
            } else {
                next.regs.a = data;
                next.regs.p.update_nz(data);
            }
            next.state = StateId::FetchOpcodeRequest;
        }

        StateId::PopStatusRequest => {
            let address = next.regs.pop();
            next.bus = BusRequest::read(address);
            next.state = StateId::PopStatusCapture;
        }
        StateId::PopStatusCapture => {
            next.regs.p = regs.p.restored(data);
            next.state = StateId::PopReturnAddrLoRequest;
        }
        StateId::PopReturnAddrLoRequest => {
            let address = next.regs.pop();
            next.bus = BusRequest::read(address);
            next.state = StateId::PopReturnAddrLoCapture;
        }
        StateId::PopReturnAddrLoCapture => {
            next.regs.pc = (regs.pc & 0xFF00) | u16::from(data);
            next.state = StateId::PopReturnAddrHiRequest;
        }
        StateId::PopReturnAddrHiRequest => {
            let address = next.regs.pop();
            next.bus = BusRequest::read(address);
            next.state = StateId::PopReturnAddrHiCapture;
        }
        StateId::PopReturnAddrHiCapture => {
            next.regs.pc = (u16::from(data) << 8) | (regs.pc & 0x00FF);
            next.state = StateId::FetchOpcodeRequest;
        }

        StateId::PushReturnAddrHiRequest => {
            let address = next.regs.push();
            next.bus = BusRequest::write(address, (regs.pc >> 8) as u8);
            next.state = StateId::PushReturnAddrHiFinish;
        }
        StateId::PushReturnAddrHiFinish => {
            next.state = StateId::PushReturnAddrLoRequest;
        }
        StateId::PushReturnAddrLoRequest => {
            let address = next.regs.push();
            next.bus = BusRequest::write(address, regs.pc as u8);
            next.state = StateId::PushReturnAddrLoFinish;
        }
        StateId::PushReturnAddrLoFinish => {
            next.regs.pc = current.effective_address;
            next.state = StateId::FetchOpcodeRequest;
        }

        StateId::StoreOperandFinish | StateId::FinishPush => {
            next.state = StateId::FetchOpcodeRequest;
        }

        StateId::Halted => {
            if control.halt {
                next.regs.p.break_ = true;
            } else {
                next.regs.p.break_ = false;
                next.state = StateId::FetchOpcodeRequest;
            }
        }
        StateId::ErrorTrap => {}
    }

    (next, next.bus)
}

fn dispatch(current: &CpuState, next: &mut CpuState) {
    let opcode = decode(current.instruction);
    next.address_mode = opcode.mode;
    next.state = match opcode.op {
        Op::Illegal => {
            warn!(
                "illegal opcode ${:02X} at ${:04X}",
                current.instruction,
                current.regs.pc.wrapping_sub(1)
            );
            StateId::ErrorTrap
        }
        Op::Undefined => {
            debug!(
                "undefined opcode ${:02X} at ${:04X} ignored",
                current.instruction,
                current.regs.pc.wrapping_sub(1)
            );
            StateId::FetchOpcodeRequest
        }
        Op::Pha | Op::Php => StateId::Push,
        Op::Pla | Op::Plp => StateId::Pop,
        Op::Rts => StateId::PopReturnAddrLoRequest,
        Op::Rti => StateId::PopStatusRequest,
        _ if opcode.mode.has_operand() => StateId::FetchOperandRequest,
        _ => {
            if opcode.mode == AddressMode::Accumulator {
                next.operand = u16::from(current.regs.a);
            }
            StateId::Execute
        }
    };
}

fn capture_operand(current: &CpuState, data: u8, next: &mut CpuState) {
    let opcode = decode(current.instruction);
    let regs = &current.regs;
    next.regs.pc = regs.pc.wrapping_add(1);
    next.operand = u16::from(data);
    match opcode.mode {
        AddressMode::Immediate | AddressMode::Relative => next.state = StateId::Execute,
        AddressMode::ZeroPage => resolved(next, opcode.op, u16::from(data)),
        AddressMode::ZeroPageX => resolved(next, opcode.op, u16::from(data.wrapping_add(regs.x))),
        AddressMode::ZeroPageY => resolved(next, opcode.op, u16::from(data.wrapping_add(regs.y))),
        AddressMode::IndirectX => {
            next.effective_address = u16::from(data.wrapping_add(regs.x));
            next.state = StateId::ReadPointerLowRequest;
        }
        AddressMode::IndirectY => {
            next.effective_address = u16::from(data);
            next.state = StateId::ReadPointerLowRequest;
        }
        AddressMode::Absolute
        | AddressMode::AbsoluteX
        | AddressMode::AbsoluteY
        | AddressMode::Indirect
        | AddressMode::Jsr => next.state = StateId::FetchAddressHighRequest,
        AddressMode::None | AddressMode::Accumulator => next.state = StateId::FetchOpcodeRequest,
    }
}

fn capture_address_high(current: &CpuState, data: u8, next: &mut CpuState) {
    let opcode = decode(current.instruction);
    let regs = &current.regs;
    let base = u16::from_le_bytes([current.operand as u8, data]);
    next.regs.pc = regs.pc.wrapping_add(1);
    match opcode.mode {
        AddressMode::AbsoluteX => resolved(next, opcode.op, base.wrapping_add(u16::from(regs.x))),
        AddressMode::AbsoluteY => resolved(next, opcode.op, base.wrapping_add(u16::from(regs.y))),
        AddressMode::Indirect => {
            next.effective_address = base;
            next.state = StateId::ReadPointerLowRequest;
        }
        _ => resolved(next, opcode.op, base),
    }
}

/// Second pointer byte. Zero-page pointers wrap within page zero.
fn pointer_high(current: &CpuState) -> u16 {
    match current.address_mode {
        AddressMode::Indirect => current.effective_address.wrapping_add(1),
        _ => u16::from((current.effective_address as u8).wrapping_add(1)),
    }
}

fn capture_pointer_high(current: &CpuState, data: u8, next: &mut CpuState) {
    let opcode = decode(current.instruction);
    let low = current.operand as u8;
    if opcode.mode == AddressMode::Indirect {
        next.regs.pc = u16::from_le_bytes([low, data]);
        next.state = StateId::FetchOpcodeRequest;
        return;
    }
    // (zp),Y indexes the low byte only; no carry into the high byte
    let low = if opcode.mode == AddressMode::IndirectY {
        low.wrapping_add(current.regs.y)
    } else {
        low
    };
    resolved(next, opcode.op, u16::from_le_bytes([low, data]));
}

/// Route an instruction whose effective address is now known.
fn resolved(next: &mut CpuState, op: Op, address: u16) {
    next.effective_address = address;
    next.state = match op {
        Op::Jmp => {
            next.regs.pc = address;
            StateId::FetchOpcodeRequest
        }
        Op::Jsr => StateId::PushReturnAddrHiRequest,
        op if op.is_store() => StateId::StoreOperandRequest,
        _ => StateId::ReadOperandRequest,
    };
}

fn execute(current: &CpuState, next: &mut CpuState) {
    let opcode = decode(current.instruction);
    let regs = &current.regs;
    let operand = current.operand as u8;
    next.state = StateId::FetchOpcodeRequest;

    match opcode.op {
        Op::Branch { flag, set } => {
            let taken = match flag {
                BranchFlag::Negative => regs.p.negative,
                BranchFlag::Overflow => regs.p.overflow,
                BranchFlag::Carry => regs.p.carry,
                BranchFlag::Zero => regs.p.zero,
            } == set;
            if taken {
                next.regs.pc = regs.pc.wrapping_add_signed(i16::from(operand as i8));
            }
        }
        Op::Bit => {
            next.regs.p.zero = regs.a & operand == 0;
            next.regs.p.negative = operand & 0x80 != 0;
            next.regs.p.overflow = operand & 0x40 != 0;
        }
        Op::Txs => next.regs.sp = regs.x,
        Op::Clc => next.regs.p.carry = false,
        Op::Sec => next.regs.p.carry = true,
        Op::Cli => next.regs.p.interrupt_disable = false,
        Op::Sei => next.regs.p.interrupt_disable = true,
        Op::Clv => next.regs.p.overflow = false,
        Op::Cld => next.regs.p.decimal = false,
        Op::Sed => next.regs.p.decimal = true,
        Op::Nop => {}
        op => {
            let out = alu::evaluate(op, regs, operand);
            next.operand = out.result;
            if let Some(overflow) = out.overflow {
                next.regs.p.overflow = overflow;
            }
            next.state = writeback_target(op, opcode.mode);
        }
    }
}

const fn writeback_target(op: Op, mode: AddressMode) -> StateId {
    match op {
        Op::Ora | Op::And | Op::Eor | Op::Adc | Op::Sbc | Op::Lda | Op::Txa | Op::Tya => {
            StateId::WritebackA
        }
        Op::Asl | Op::Rol | Op::Lsr | Op::Ror => match mode {
            AddressMode::Accumulator => StateId::WritebackA,
            _ => StateId::StoreOperandRequest,
        },
        Op::Inc | Op::Dec => StateId::StoreOperandRequest,
        Op::Ldx | Op::Tax | Op::Tsx | Op::Inx | Op::Dex => StateId::WritebackX,
        Op::Ldy | Op::Tay | Op::Iny | Op::Dey => StateId::WritebackY,
        Op::Cmp | Op::Cpx | Op::Cpy => StateId::WritebackFlags,
        _ => StateId::FetchOpcodeRequest,
    }
}

fn writeback(current: &CpuState, next: &mut CpuState) {
    let value = current.operand as u8;
    match current.state {
        StateId::WritebackA => next.regs.a = value,
        StateId::WritebackX => next.regs.x = value,
        StateId::WritebackY => next.regs.y = value,
        _ => {}
    }
    next.regs.p.update_nz(value);
    if decode(current.instruction).op.sets_carry() {
        next.regs.p.carry = current.operand & CARRY_OUT != 0;
    }
    next.state = StateId::FetchOpcodeRequest;
}

/// The engine as a [`Cpu`]: committed state plus its configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    state: CpuState,
    config: EngineConfig,
    cycles: u64,
}

impl Engine {
    /// A powered-on engine, in `Reset`.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self {
            state: CpuState::reset(&config),
            config,
            cycles: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CpuState {
        &self.state
    }

    /// Direct access for harnesses that preload registers.
    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ticks executed since power-on.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// True at an instruction boundary.
    #[must_use]
    pub fn is_instruction_complete(&self) -> bool {
        self.state.state == StateId::FetchOpcodeRequest
    }

    #[must_use]
    pub fn trap(&self) -> Option<Trap> {
        (self.state.state == StateId::ErrorTrap).then(|| Trap {
            opcode: self.state.instruction,
            address: self.state.regs.pc.wrapping_sub(1),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Cpu for Engine {
    type Registers = Registers;

    fn tick(&mut self, control: &Control) -> BusRequest {
        let (next, request) = transition(&self.state, control, &self.config);
        if next.state != self.state.state {
            trace!(
                "{:04X} {} -> {}",
                self.state.regs.pc,
                self.state.state.name(),
                next.state.name()
            );
        }
        self.state = next;
        self.cycles += 1;
        request
    }

    fn pc(&self) -> u16 {
        self.state.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.state.regs
    }

    fn is_halted(&self) -> bool {
        self.state.state == StateId::Halted
    }

    fn is_trapped(&self) -> bool {
        self.state.state == StateId::ErrorTrap
    }

    fn reset(&mut self) {
        self.state = CpuState::reset(&self.config);
    }
}

impl Observable for Engine {
    fn query(&self, path: &str) -> Option<Value> {
        let s = &self.state;
        let p = &s.regs.p;
        match path {
            "pc" => Some(s.regs.pc.into()),
            "a" => Some(s.regs.a.into()),
            "x" => Some(s.regs.x.into()),
            "y" => Some(s.regs.y.into()),
            "sp" | "s" => Some(s.regs.sp.into()),
            "p" | "status" => Some(p.to_byte().into()),
            "flags.n" => Some(p.negative.into()),
            "flags.v" => Some(p.overflow.into()),
            "flags.b" => Some(p.break_.into()),
            "flags.d" => Some(p.decimal.into()),
            "flags.i" => Some(p.interrupt_disable.into()),
            "flags.z" => Some(p.zero.into()),
            "flags.c" => Some(p.carry.into()),
            "state" => Some(s.state.name().into()),
            "instruction" => Some(s.instruction.into()),
            "effective_address" => Some(s.effective_address.into()),
            "operand" => Some(s.operand.into()),
            "cycle" => Some(Value::U64(self.cycles)),
            "halted" => Some(self.is_halted().into()),
            "trapped" => Some(self.is_trapped().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "x",
            "y",
            "sp",
            "p",
            "flags.n",
            "flags.v",
            "flags.b",
            "flags.d",
            "flags.i",
            "flags.z",
            "flags.c",
            "state",
            "instruction",
            "effective_address",
            "operand",
            "cycle",
            "halted",
            "trapped",
        ]
    }
}
