//! Instruction descriptors
//!
//! A descriptor is one record of the instruction catalog: the mnemonic under test, its operand
//! shape, the numeric domain of its registers and, for memory instructions, the address window
//! it may touch.

use rand::Rng;
use riscv::{NumericDomain, OperandShape};
use serde::{Deserialize, Serialize};

use crate::GenError;

/// Distance kept between generated base addresses and the window limits, so that adding any
/// instruction offset stays inside the window
pub const ADDRESS_SAFETY_MARGIN: u64 = 2048;

/// Memory window `[base, end)` used by load/store test programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub base: u64,
    pub end: u64,
}

impl AddressRange {
    pub fn new(base: u64, end: u64) -> Self {
        AddressRange { base, end }
    }

    /// Returns true if the window leaves room for the safety margin on both sides
    pub fn is_usable(&self) -> bool {
        self.end >= self.base && self.end - self.base >= 2 * ADDRESS_SAFETY_MARGIN
    }

    /// Returns an 8-byte aligned address in `[base + margin, end - margin]`
    pub fn random_base<R: Rng>(&self, rng: &mut R) -> u64 {
        let addr =
            rng.gen_range(self.base + ADDRESS_SAFETY_MARGIN..=self.end - ADDRESS_SAFETY_MARGIN);
        (addr >> 3) << 3
    }

    /// Returns a load/store byte offset, a multiple of 8 in `0..=2040`
    pub fn random_offset<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.gen_range(1..=256u64) * 8 - 8
    }
}

/// Catalog record describing one instruction under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstDescriptor {
    /// Instruction mnemonic, as accepted by the assembler
    pub mnemonic: String,
    /// Operand shape used to produce the instruction lines
    pub shape: OperandShape,
    /// Numeric domain of the initialized registers
    #[serde(default)]
    pub domain: NumericDomain,
    /// Memory window for load/store shapes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_range: Option<AddressRange>,
    /// File name prefix specific to this record, e.g. `not_taken_`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
}

impl InstDescriptor {
    pub fn new(mnemonic: &str, shape: OperandShape, domain: NumericDomain) -> Self {
        InstDescriptor {
            mnemonic: mnemonic.to_string(),
            shape,
            domain,
            address_range: None,
            prefix: String::new(),
        }
    }

    pub fn with_range(mut self, base: u64, end: u64) -> Self {
        self.address_range = Some(AddressRange::new(base, end));
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Builds the output file name
    /// `<run prefix><record prefix><mnemonic>_<iterations>x<count>[_init].s`
    pub fn file_name(&self, run_prefix: &str, iterations: u64, count: usize, init: bool) -> String {
        format!(
            "{}{}{}_{}x{}{}.s",
            run_prefix,
            self.prefix,
            self.mnemonic,
            iterations,
            count,
            if init { "_init" } else { "" }
        )
    }

    /// Checks that the record carries everything its shape needs
    pub fn validate(&self) -> Result<(), GenError> {
        let invalid = |reason: &str| GenError::InvalidRequest {
            mnemonic: self.mnemonic.clone(),
            reason: reason.to_string(),
        };

        if self.mnemonic.trim().is_empty() {
            return Err(invalid("empty mnemonic"));
        }
        if self.shape.needs_address_range() {
            match &self.address_range {
                None => return Err(invalid("load/store shape without an address range")),
                Some(range) if !range.is_usable() => {
                    return Err(invalid("address range is narrower than twice the safety margin"))
                }
                Some(_) => {}
            }
        }
        if self.shape == OperandShape::FloatLoadStore && self.domain == NumericDomain::Integer {
            return Err(invalid("floating-point load/store needs the single or double domain"));
        }
        Ok(())
    }
}
