//! Instruction decoding
//!
//! An instruction cell packs an opcode and a mode digit per parameter:
//!
//! ```text
//!   1002  →  opcode 02 (Multiply), modes (0, 1, 0)
//!    ^^      read right to left above the opcode:
//!    ||      param 1 = 0 (Position)
//!    |+----- param 2 = 1 (Immediate)
//!    +------ param 3 = 0 (Position, implied)
//! ```
//!
//! Missing mode digits default to [`Mode::Position`]. The instruction length
//! is fixed per opcode (see [`Opcode::param_count`]).

use super::constants::{MODE_RADIX, OPCODE_MODULUS};
use super::errors::MachineError;
use crate::memory::{Cell, Tape};
use num_traits::{Signed, ToPrimitive};

/// Operation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Multiply,
    Input,
    Output,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equals,
    AdjustRelativeBase,
    Halt,
}

impl Opcode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Opcode::Add),
            2 => Some(Opcode::Multiply),
            3 => Some(Opcode::Input),
            4 => Some(Opcode::Output),
            5 => Some(Opcode::JumpIfTrue),
            6 => Some(Opcode::JumpIfFalse),
            7 => Some(Opcode::LessThan),
            8 => Some(Opcode::Equals),
            9 => Some(Opcode::AdjustRelativeBase),
            99 => Some(Opcode::Halt),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Opcode::Add => 1,
            Opcode::Multiply => 2,
            Opcode::Input => 3,
            Opcode::Output => 4,
            Opcode::JumpIfTrue => 5,
            Opcode::JumpIfFalse => 6,
            Opcode::LessThan => 7,
            Opcode::Equals => 8,
            Opcode::AdjustRelativeBase => 9,
            Opcode::Halt => 99,
        }
    }

    pub fn param_count(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelativeBase => 1,
            Opcode::Halt => 0,
        }
    }

    /// Instruction length including the opcode cell
    pub fn length(self) -> usize {
        self.param_count() + 1
    }

    /// Index of the parameter used as a write destination, if any
    pub fn write_param(self) -> Option<usize> {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => Some(2),
            Opcode::Input => Some(0),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Multiply => "MUL",
            Opcode::Input => "IN",
            Opcode::Output => "OUT",
            Opcode::JumpIfTrue => "JNZ",
            Opcode::JumpIfFalse => "JZ",
            Opcode::LessThan => "LT",
            Opcode::Equals => "EQ",
            Opcode::AdjustRelativeBase => "ARB",
            Opcode::Halt => "HALT",
        }
    }
}

/// Parameter addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Position,
    Immediate,
    Relative,
}

impl Mode {
    fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Mode::Position),
            1 => Some(Mode::Immediate),
            2 => Some(Mode::Relative),
            _ => None,
        }
    }
}

/// A (mode, raw value) pair as it appears on the tape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub mode: Mode,
    pub raw: Cell,
}

impl Parameter {
    /// Effective address of this parameter, or `None` in immediate mode
    pub fn address(&self, relative_base: &Cell) -> Option<Cell> {
        match self.mode {
            Mode::Position => Some(self.raw.clone()),
            Mode::Immediate => None,
            Mode::Relative => Some(&self.raw + relative_base),
        }
    }

    /// Resolve this parameter as a read operand
    pub fn load(&self, tape: &Tape, relative_base: &Cell) -> Result<Cell, MachineError> {
        match self.address(relative_base) {
            Some(addr) => tape.read(&addr),
            None => Ok(self.raw.clone()),
        }
    }
}

/// A fully decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub params: Vec<Parameter>,
}

impl Instruction {
    pub fn length(&self) -> usize {
        self.opcode.length()
    }
}

/// Decode the instruction starting at `pc`.
///
/// Fails with [`MachineError::InvalidOpcode`] when the opcode is unknown,
/// when a mode digit is not 0, 1 or 2, or when a write destination is encoded
/// in immediate mode.
pub fn decode(tape: &Tape, pc: usize) -> Result<Instruction, MachineError> {
    let word = tape.read_at(pc);
    let invalid = || MachineError::InvalidOpcode {
        instruction: word.clone(),
        pc,
    };

    if word.is_negative() {
        return Err(invalid());
    }

    let opcode = (&word % OPCODE_MODULUS)
        .to_u32()
        .and_then(Opcode::from_code)
        .ok_or_else(invalid)?;

    let mut modes = &word / OPCODE_MODULUS;
    let mut params = Vec::with_capacity(opcode.param_count());
    for i in 0..opcode.param_count() {
        let digit = (&modes % MODE_RADIX).to_u32().ok_or_else(invalid)?;
        let mode = Mode::from_digit(digit).ok_or_else(invalid)?;
        if mode == Mode::Immediate && opcode.write_param() == Some(i) {
            return Err(invalid());
        }
        modes /= MODE_RADIX;
        params.push(Parameter {
            mode,
            raw: tape.read_at(pc.saturating_add(1 + i)),
        });
    }

    Ok(Instruction { opcode, params })
}

/// Render the instruction at `pc` for display.
///
/// Position operands are shown as `[n]`, immediate as `#n`, relative as
/// `~n`. Cells that do not decode are shown as `DATA n`.
pub fn disassemble(tape: &Tape, pc: usize) -> String {
    match decode(tape, pc) {
        Ok(instruction) => {
            let mut text = String::from(instruction.opcode.mnemonic());
            for param in &instruction.params {
                let operand = match param.mode {
                    Mode::Position => format!("[{}]", param.raw),
                    Mode::Immediate => format!("#{}", param.raw),
                    Mode::Relative => format!("~{}", param.raw),
                };
                text.push(' ');
                text.push_str(&operand);
            }
            text
        }
        Err(_) => format!("DATA {}", tape.read_at(pc)),
    }
}
