//! Engine state: FSM state identifiers and the register aggregate.

use sync_core::BusRequest;

use crate::decode::AddressMode;
use crate::{EngineConfig, Registers};

/// FSM state. The sole driver of engine behaviour each tick.
///
/// Every bus transaction takes two states: a request that drives the
/// address (and data/strobe for writes), then a capture that consumes
/// `data_out` (or releases the write strobe).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateId {
    Reset,
    StartupDelay,
    FetchOpcodeRequest,
    FetchOpcodeCapture,
    Dispatch,
    /// First operand byte: immediate, zero page, low address byte,
    /// pointer or branch displacement.
    FetchOperandRequest,
    FetchOperandCapture,
    FetchAddressHighRequest,
    FetchAddressHighCapture,
    ReadPointerLowRequest,
    ReadPointerLowCapture,
    ReadPointerHighRequest,
    ReadPointerHighCapture,
    ReadOperandRequest,
    ReadOperandCapture,
    Execute,
    WritebackA,
    WritebackX,
    WritebackY,
    /// Compare results: flags only.
    WritebackFlags,
    StoreOperandRequest,
    StoreOperandFinish,
    Push,
    FinishPush,
    Pop,
    FinishPop,
    PopStatusRequest,
    PopStatusCapture,
    PopReturnAddrLoRequest,
    PopReturnAddrLoCapture,
    PopReturnAddrHiRequest,
    PopReturnAddrHiCapture,
    PushReturnAddrHiRequest,
    PushReturnAddrHiFinish,
    PushReturnAddrLoRequest,
    PushReturnAddrLoFinish,
    /// Parked by the halt input.
    Halted,
    /// Illegal opcode. Only a reset leaves this state.
    ErrorTrap,
}

impl StateId {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reset => "Reset",
            Self::StartupDelay => "StartupDelay",
            Self::FetchOpcodeRequest => "FetchOpcodeRequest",
            Self::FetchOpcodeCapture => "FetchOpcodeCapture",
            Self::Dispatch => "Dispatch",
            Self::FetchOperandRequest => "FetchOperandRequest",
            Self::FetchOperandCapture => "FetchOperandCapture",
            Self::FetchAddressHighRequest => "FetchAddressHighRequest",
            Self::FetchAddressHighCapture => "FetchAddressHighCapture",
            Self::ReadPointerLowRequest => "ReadPointerLowRequest",
            Self::ReadPointerLowCapture => "ReadPointerLowCapture",
            Self::ReadPointerHighRequest => "ReadPointerHighRequest",
            Self::ReadPointerHighCapture => "ReadPointerHighCapture",
            Self::ReadOperandRequest => "ReadOperandRequest",
            Self::ReadOperandCapture => "ReadOperandCapture",
            Self::Execute => "Execute",
            Self::WritebackA => "WritebackA",
            Self::WritebackX => "WritebackX",
            Self::WritebackY => "WritebackY",
            Self::WritebackFlags => "WritebackFlags",
            Self::StoreOperandRequest => "StoreOperandRequest",
            Self::StoreOperandFinish => "StoreOperandFinish",
            Self::Push => "Push",
            Self::FinishPush => "FinishPush",
            Self::Pop => "Pop",
            Self::FinishPop => "FinishPop",
            Self::PopStatusRequest => "PopStatusRequest",
            Self::PopStatusCapture => "PopStatusCapture",
            Self::PopReturnAddrLoRequest => "PopReturnAddrLoRequest",
            Self::PopReturnAddrLoCapture => "PopReturnAddrLoCapture",
            Self::PopReturnAddrHiRequest => "PopReturnAddrHiRequest",
            Self::PopReturnAddrHiCapture => "PopReturnAddrHiCapture",
            Self::PushReturnAddrHiRequest => "PushReturnAddrHiRequest",
            Self::PushReturnAddrHiFinish => "PushReturnAddrHiFinish",
            Self::PushReturnAddrLoRequest => "PushReturnAddrLoRequest",
            Self::PushReturnAddrLoFinish => "PushReturnAddrLoFinish",
            Self::Halted => "Halted",
            Self::ErrorTrap => "ErrorTrap",
        }
    }
}

/// Everything the engine remembers between ticks.
///
/// Fixed size and `Copy`: a tick reads one snapshot and produces the
/// next one whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub regs: Registers,
    /// Instruction register.
    pub instruction: u8,
    pub address_mode: AddressMode,
    /// Valid only while `address_mode` is not `None`.
    pub effective_address: u16,
    /// Fetched operand, or the 9-bit ALU result awaiting writeback.
    pub operand: u16,
    pub state: StateId,
    /// Remaining `StartupDelay` ticks.
    pub delay: u8,
    /// Registered bus outputs.
    pub bus: BusRequest,
}

impl CpuState {
    /// The state committed by a reset.
    #[must_use]
    pub const fn reset(config: &EngineConfig) -> Self {
        Self {
            regs: Registers::reset(config.reset_sp),
            instruction: 0,
            address_mode: AddressMode::None,
            effective_address: 0,
            operand: 0,
            state: StateId::Reset,
            delay: 0,
            bus: BusRequest::read(0),
        }
    }
}
