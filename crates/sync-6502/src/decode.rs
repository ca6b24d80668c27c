//! Instruction decoder.
//!
//! Opcodes follow the `aaabbbcc` layout:
//! - `cc` (bits 1:0) selects the instruction class
//! - `bbb` (bits 4:2) selects the addressing-mode group, read per class
//! - `aaa` (bits 7:5) selects the operation, read per class
//!
//! The full 256-entry table is built once at compile time from those
//! triples. Decoding is total: every byte maps to an [`Opcode`], with
//! unassigned combinations decoding to [`Op::Undefined`] and class `11`
//! to [`Op::Illegal`].

use std::fmt;

/// Instruction class, from the `cc` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// `00`: control flow, stack, flag and Y/X compare/load group.
    Control,
    /// `01`: accumulator ALU group.
    Alu,
    /// `10`: shift/rotate, X load/store and memory increment group.
    Shift,
    /// `11`: not an instruction class on this processor.
    Illegal,
}

/// The raw fields of an instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub class: Class,
    /// `aaa`, bits 7:5.
    pub operation: u8,
    /// `bbb`, bits 4:2.
    pub mode_group: u8,
}

/// Split an instruction byte into its `(class, operation, mode_group)`.
#[must_use]
pub const fn split(byte: u8) -> Fields {
    let class = match byte & 0b11 {
        0b00 => Class::Control,
        0b01 => Class::Alu,
        0b10 => Class::Shift,
        _ => Class::Illegal,
    };
    Fields {
        class,
        operation: byte >> 5,
        mode_group: (byte >> 2) & 0b111,
    }
}

/// How an instruction locates its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Implied: no operand bytes.
    None,
    /// Operates on the accumulator.
    Accumulator,
    Immediate,
    /// Signed branch displacement.
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `(zp,X)`
    IndirectX,
    /// `(zp),Y`
    IndirectY,
    /// `(abs)`, JMP only.
    Indirect,
    /// Absolute target plus return-address push.
    Jsr,
}

impl AddressMode {
    /// Whether the mode reads operand bytes after the opcode.
    #[must_use]
    pub const fn has_operand(self) -> bool {
        !matches!(self, Self::None | Self::Accumulator)
    }
}

/// Flag tested by a conditional branch, from the top two bits of `aaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchFlag {
    Negative,
    Overflow,
    Carry,
    Zero,
}

/// Decoded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    // Class 01
    Ora,
    And,
    Eor,
    Adc,
    Sta,
    Lda,
    Cmp,
    Sbc,
    // Class 10
    Asl,
    Rol,
    Lsr,
    Ror,
    Stx,
    Ldx,
    Dec,
    Inc,
    Txa,
    Tax,
    Dex,
    Nop,
    Txs,
    Tsx,
    // Class 00
    Bit,
    Jmp,
    Sty,
    Ldy,
    Cpy,
    Cpx,
    /// Taken when `flag` equals `set`.
    Branch { flag: BranchFlag, set: bool },
    Jsr,
    Rti,
    Rts,
    Php,
    Plp,
    Pha,
    Pla,
    Dey,
    Tay,
    Iny,
    Inx,
    Clc,
    Sec,
    Cli,
    Sei,
    Tya,
    Clv,
    Cld,
    Sed,
    /// Valid class, no handler: behaves as a one-byte no-op.
    Undefined,
    /// Class `11`: traps the engine.
    Illegal,
}

impl Op {
    /// Operations whose writeback derives carry from bit 8 of the result.
    #[must_use]
    pub const fn sets_carry(self) -> bool {
        matches!(
            self,
            Self::Adc
                | Self::Sbc
                | Self::Cmp
                | Self::Cpx
                | Self::Cpy
                | Self::Asl
                | Self::Rol
                | Self::Lsr
                | Self::Ror
        )
    }

    /// Register stores: the effective address is written, never read.
    #[must_use]
    pub const fn is_store(self) -> bool {
        matches!(self, Self::Sta | Self::Stx | Self::Sty)
    }

    /// Shifts and rotates.
    #[must_use]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Asl | Self::Rol | Self::Lsr | Self::Ror)
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Ora => "ORA",
            Self::And => "AND",
            Self::Eor => "EOR",
            Self::Adc => "ADC",
            Self::Sta => "STA",
            Self::Lda => "LDA",
            Self::Cmp => "CMP",
            Self::Sbc => "SBC",
            Self::Asl => "ASL",
            Self::Rol => "ROL",
            Self::Lsr => "LSR",
            Self::Ror => "ROR",
            Self::Stx => "STX",
            Self::Ldx => "LDX",
            Self::Dec => "DEC",
            Self::Inc => "INC",
            Self::Txa => "TXA",
            Self::Tax => "TAX",
            Self::Dex => "DEX",
            Self::Nop => "NOP",
            Self::Txs => "TXS",
            Self::Tsx => "TSX",
            Self::Bit => "BIT",
            Self::Jmp => "JMP",
            Self::Sty => "STY",
            Self::Ldy => "LDY",
            Self::Cpy => "CPY",
            Self::Cpx => "CPX",
            Self::Branch { flag, set } => match (flag, set) {
                (BranchFlag::Negative, false) => "BPL",
                (BranchFlag::Negative, true) => "BMI",
                (BranchFlag::Overflow, false) => "BVC",
                (BranchFlag::Overflow, true) => "BVS",
                (BranchFlag::Carry, false) => "BCC",
                (BranchFlag::Carry, true) => "BCS",
                (BranchFlag::Zero, false) => "BNE",
                (BranchFlag::Zero, true) => "BEQ",
            },
            Self::Jsr => "JSR",
            Self::Rti => "RTI",
            Self::Rts => "RTS",
            Self::Php => "PHP",
            Self::Plp => "PLP",
            Self::Pha => "PHA",
            Self::Pla => "PLA",
            Self::Dey => "DEY",
            Self::Tay => "TAY",
            Self::Iny => "INY",
            Self::Inx => "INX",
            Self::Clc => "CLC",
            Self::Sec => "SEC",
            Self::Cli => "CLI",
            Self::Sei => "SEI",
            Self::Tya => "TYA",
            Self::Clv => "CLV",
            Self::Cld => "CLD",
            Self::Sed => "SED",
            Self::Undefined => "???",
            Self::Illegal => "ILL",
        }
    }
}

/// A decoded instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub op: Op,
    pub mode: AddressMode,
}

impl Opcode {
    const fn new(op: Op, mode: AddressMode) -> Self {
        Self { op, mode }
    }

    const fn implied(op: Op) -> Self {
        Self::new(op, AddressMode::None)
    }

    const UNDEFINED: Self = Self::implied(Op::Undefined);
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.mode {
            AddressMode::None | AddressMode::Relative | AddressMode::Jsr => "",
            AddressMode::Accumulator => " A",
            AddressMode::Immediate => " #",
            AddressMode::ZeroPage => " zp",
            AddressMode::ZeroPageX => " zp,X",
            AddressMode::ZeroPageY => " zp,Y",
            AddressMode::Absolute => " abs",
            AddressMode::AbsoluteX => " abs,X",
            AddressMode::AbsoluteY => " abs,Y",
            AddressMode::IndirectX => " (zp,X)",
            AddressMode::IndirectY => " (zp),Y",
            AddressMode::Indirect => " (abs)",
        };
        write!(f, "{}{suffix}", self.op.mnemonic())
    }
}

/// The decode table, indexed by instruction byte.
pub static OPCODES: [Opcode; 256] = build_table();

/// Decode an instruction byte.
#[must_use]
pub fn decode(byte: u8) -> Opcode {
    OPCODES[usize::from(byte)]
}

const fn build_table() -> [Opcode; 256] {
    let mut table = [Opcode::UNDEFINED; 256];
    let mut byte = 0;
    while byte < 256 {
        table[byte] = decode_fields(split(byte as u8));
        byte += 1;
    }
    table
}

const fn decode_fields(fields: Fields) -> Opcode {
    let Fields {
        class,
        operation: aaa,
        mode_group: bbb,
    } = fields;
    match class {
        Class::Alu => decode_alu(aaa, bbb),
        Class::Shift => decode_shift(aaa, bbb),
        Class::Control => decode_control(aaa, bbb),
        Class::Illegal => Opcode::implied(Op::Illegal),
    }
}

const fn decode_alu(aaa: u8, bbb: u8) -> Opcode {
    let op = match aaa {
        0 => Op::Ora,
        1 => Op::And,
        2 => Op::Eor,
        3 => Op::Adc,
        4 => Op::Sta,
        5 => Op::Lda,
        6 => Op::Cmp,
        _ => Op::Sbc,
    };
    let mode = match bbb {
        0 => AddressMode::IndirectX,
        1 => AddressMode::ZeroPage,
        2 => AddressMode::Immediate,
        3 => AddressMode::Absolute,
        4 => AddressMode::IndirectY,
        5 => AddressMode::ZeroPageX,
        6 => AddressMode::AbsoluteY,
        _ => AddressMode::AbsoluteX,
    };
    if matches!(op, Op::Sta) && matches!(mode, AddressMode::Immediate) {
        return Opcode::UNDEFINED;
    }
    Opcode::new(op, mode)
}

const fn decode_shift(aaa: u8, bbb: u8) -> Opcode {
    // bbb=010 and bbb=110 hold the one-byte register ops of this class.
    match (aaa, bbb) {
        (4, 2) => return Opcode::implied(Op::Txa),
        (5, 2) => return Opcode::implied(Op::Tax),
        (6, 2) => return Opcode::implied(Op::Dex),
        (7, 2) => return Opcode::implied(Op::Nop),
        (4, 6) => return Opcode::implied(Op::Txs),
        (5, 6) => return Opcode::implied(Op::Tsx),
        _ => {}
    }
    let op = match aaa {
        0 => Op::Asl,
        1 => Op::Rol,
        2 => Op::Lsr,
        3 => Op::Ror,
        4 => Op::Stx,
        5 => Op::Ldx,
        6 => Op::Dec,
        _ => Op::Inc,
    };
    // STX/LDX index with Y where the rest of the class uses X.
    let uses_y = matches!(op, Op::Stx | Op::Ldx);
    let mode = match bbb {
        0 if matches!(op, Op::Ldx) => AddressMode::Immediate,
        1 => AddressMode::ZeroPage,
        2 if op.is_shift() => AddressMode::Accumulator,
        3 => AddressMode::Absolute,
        5 if uses_y => AddressMode::ZeroPageY,
        5 => AddressMode::ZeroPageX,
        7 if matches!(op, Op::Ldx) => AddressMode::AbsoluteY,
        7 if !uses_y => AddressMode::AbsoluteX,
        _ => return Opcode::UNDEFINED,
    };
    Opcode::new(op, mode)
}

const fn decode_control(aaa: u8, bbb: u8) -> Opcode {
    match bbb {
        4 => {
            let flag = match aaa >> 1 {
                0 => BranchFlag::Negative,
                1 => BranchFlag::Overflow,
                2 => BranchFlag::Carry,
                _ => BranchFlag::Zero,
            };
            Opcode::new(
                Op::Branch {
                    flag,
                    set: aaa & 1 == 1,
                },
                AddressMode::Relative,
            )
        }
        2 => Opcode::implied(match aaa {
            0 => Op::Php,
            1 => Op::Plp,
            2 => Op::Pha,
            3 => Op::Pla,
            4 => Op::Dey,
            5 => Op::Tay,
            6 => Op::Iny,
            _ => Op::Inx,
        }),
        6 => Opcode::implied(match aaa {
            0 => Op::Clc,
            1 => Op::Sec,
            2 => Op::Cli,
            3 => Op::Sei,
            4 => Op::Tya,
            5 => Op::Clv,
            6 => Op::Cld,
            _ => Op::Sed,
        }),
        0 => match aaa {
            1 => Opcode::new(Op::Jsr, AddressMode::Jsr),
            2 => Opcode::implied(Op::Rti),
            3 => Opcode::implied(Op::Rts),
            5 => Opcode::new(Op::Ldy, AddressMode::Immediate),
            6 => Opcode::new(Op::Cpy, AddressMode::Immediate),
            7 => Opcode::new(Op::Cpx, AddressMode::Immediate),
            // BRK has no interrupt machinery to dispatch into.
            _ => Opcode::UNDEFINED,
        },
        1 | 3 => {
            let mode = if bbb == 1 {
                AddressMode::ZeroPage
            } else {
                AddressMode::Absolute
            };
            match aaa {
                1 => Opcode::new(Op::Bit, mode),
                2 if bbb == 3 => Opcode::new(Op::Jmp, AddressMode::Absolute),
                3 if bbb == 3 => Opcode::new(Op::Jmp, AddressMode::Indirect),
                4 => Opcode::new(Op::Sty, mode),
                5 => Opcode::new(Op::Ldy, mode),
                6 => Opcode::new(Op::Cpy, mode),
                7 => Opcode::new(Op::Cpx, mode),
                _ => Opcode::UNDEFINED,
            }
        }
        5 => match aaa {
            4 => Opcode::new(Op::Sty, AddressMode::ZeroPageX),
            5 => Opcode::new(Op::Ldy, AddressMode::ZeroPageX),
            _ => Opcode::UNDEFINED,
        },
        7 if aaa == 5 => Opcode::new(Op::Ldy, AddressMode::AbsoluteX),
        _ => Opcode::UNDEFINED,
    }
}
