//! RISC-V instruction operand shapes
//!
//! Every instruction exercised by a test program belongs to one operand shape.  A shape fixes
//! which register files supply the operands, whether destination registers are reserved and the
//! textual layout of the instruction line.  Shapes loosely follow the base encoding formats:
//! ```text
//!  31 30 29 28 27 26 25 24 23 22 21 20 19 18 17 16 15 14 13 12 11 10 09 08 07 06 05 04 03 02 01 00
//! |      funct7        |      rs2     |      rs1     | funct3 |      rd      |       opcode       | R-type
//! |     rs3      |fmt  |      rs2     |      rs1     |   rm   |      rd      |       opcode       | R4-type
//! |               imm[11:0]           |      rs1     | funct3 |      rd      |       opcode       | I-type
//! |     imm[11:5]      |      rs2     |      rs1     | funct3 |   imm[4:0]   |       opcode       | S-type
//! |12|    imm[10:5]    |      rs2     |      rs1     | funct3 |imm[4:1]   |11|       opcode       | B-type
//! |                         imm[31:12]                        |      rd      |       opcode       | U-type
//! |20|           imm[10:1]         |11|      imm[19:12]       |      rd      |       opcode       | J-type
//! ```
//! The assembler argument order is always destination first, e.g. `add rd, rs1, rs2`,
//! `lw rd, imm(rs1)`, `sw rs2, imm(rs1)`, `beq rs1, rs2, label`.

use serde::{Deserialize, Serialize};

use crate::RegisterFile;

/// Comparison mode of a conditional branch test.
///
/// Operands are taken from two register groups split at the median of their initial values, so
/// the branch outcome is known when the program is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchMode {
    /// Both operands hold the same value
    Equal,
    /// First operand from the low group, second from the high group
    Lower,
    /// First operand from the high group, second from the low group
    Greater,
}

/// Instruction operand shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandShape {
    /// `lui rd, imm20` (U-type)
    UpperImmediate,
    /// `add rd, rs1, rs2` (R-type)
    RegReg,
    /// R-type divide/remainder whose sources never hold zero
    DivRem,
    /// `slli rd, rs1, shamt`
    ShiftAmount,
    /// `addi rd, rs1, imm12` (I-type)
    RegImm,
    /// `lw rd, off(rs1)` / `sw rs2, off(rs1)` (I/S-type)
    LoadStore,
    /// `flw fd, off(xs1)`: float data, integer base
    FloatLoadStore,
    /// `fmadd.s rd, rs1, rs2, rs3` (R4-type)
    Fused,
    /// `fsqrt.s rd, rs1`
    Unary,
    /// `feq.s xd, fs1, fs2`: float comparison with integer destination
    Compare,
    /// `fcvt.w.s xd, fs1`
    FloatToInt,
    /// `fcvt.s.w fd, xs1`
    IntToFloat,
    /// `jal rd, label` (J-type)
    Jump,
    /// `jalr rd, rs1, imm12`
    IndirectJump,
    /// `beq rs1, rs2, label` (B-type)
    Branch(BranchMode),
    /// Mnemonic without operands, e.g. `nop`
    NoOperand,
    /// No template exists: the loop body is filled with placeholder comments
    Untemplated,
}

impl OperandShape {
    /// Returns true if the shape needs a control-flow-valid jump table for its loop body
    pub fn is_control_flow(&self) -> bool {
        matches!(self, OperandShape::Jump | OperandShape::IndirectJump | OperandShape::Branch(_))
    }

    /// Returns true if the shape addresses memory through an address range
    pub fn needs_address_range(&self) -> bool {
        matches!(self, OperandShape::LoadStore | OperandShape::FloatLoadStore)
    }
}

/// Numeric domain of the registers initialized for a test program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericDomain {
    /// RV32I/RV64I/M integer values
    #[default]
    Integer,
    /// RV32F single precision values
    Single,
    /// RV32D double precision values
    Double,
}

impl NumericDomain {
    /// Register file that holds values of this domain
    pub fn register_file(self) -> RegisterFile {
        match self {
            NumericDomain::Integer => RegisterFile::Integer,
            NumericDomain::Single | NumericDomain::Double => RegisterFile::Float,
        }
    }

    /// Load mnemonic used to bring a memory literal of this domain into a register
    pub fn literal_load(self) -> Option<&'static str> {
        match self {
            NumericDomain::Integer => None,
            NumericDomain::Single => Some("flw"),
            NumericDomain::Double => Some("fld"),
        }
    }
}
