//! RISC-V register files
//!
//! Test programs address registers by their generic names (`xN`, `fN`) so that the emitted text
//! does not depend on the assembler's ABI aliases.
//!
//! | X name | ABI name | Role in a generated program                      |
//! |--------|----------|--------------------------------------------------|
//! | x0     | zero     | Read always as zero, never a destination         |
//! | x1     | ra       | Loop iteration counter, never part of a pool     |
//! | x15    | a5       | Scratch base for floating-point literal loads    |
//! | x2-x31 |          | Operand pools                                    |
//! | f0-f31 |          | Operand pools for the single/double domains      |
//!
//! References:
//!     - https://riscv-non-isa.github.io/riscv-elf-psabi-doc/#_register_convention

use std::fmt;

/// Number of registers in each register file
pub const REGS_IN_FILE: u8 = 32;

/// A register of the integer (`X`) or floating-point (`F`) register file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    X(u8),
    F(u8),
}

/// Hard-wired zero register
pub const REG_ZERO: Reg = Reg::X(0);

/// Register holding the remaining loop iterations
pub const REG_LOOP_COUNTER: Reg = Reg::X(1);

/// Register used as `%hi` base when loading floating-point literals from memory
pub const REG_LITERAL_BASE: Reg = Reg::X(15);

impl Reg {
    /// Returns true for the hard-wired zero register
    pub fn is_zero(&self) -> bool {
        *self == REG_ZERO
    }

    /// Returns true for registers of the floating-point register file
    pub fn is_float(&self) -> bool {
        matches!(self, Reg::F(_))
    }

    /// Returns the register index inside its register file
    pub fn index(&self) -> u8 {
        match self {
            Reg::X(i) | Reg::F(i) => *i,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::X(i) => write!(f, "x{i}"),
            Reg::F(i) => write!(f, "f{i}"),
        }
    }
}

/// Register file selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFile {
    Integer,
    Float,
}

impl RegisterFile {
    /// Returns the ordered operand candidates of this register file.
    ///
    /// The integer file yields `x0, x2..x31`: the zero register stays a valid source operand but
    /// the loop counter is left out.  The float file yields `f0..f31`.
    pub fn candidates(self) -> Vec<Reg> {
        match self {
            RegisterFile::Integer => (0..REGS_IN_FILE)
                .map(Reg::X)
                .filter(|r| *r != REG_LOOP_COUNTER)
                .collect(),
            RegisterFile::Float => (0..REGS_IN_FILE).map(Reg::F).collect(),
        }
    }
}

/// Integer registers that may receive a result or act as a memory base in any program: every
/// integer register except the zero register and the loop counter
pub fn int_targets() -> Vec<Reg> {
    RegisterFile::Integer.candidates().into_iter().filter(|r| !r.is_zero()).collect()
}

/// Floating-point registers that may receive a result in any program
pub fn float_targets() -> Vec<Reg> {
    RegisterFile::Float.candidates()
}
