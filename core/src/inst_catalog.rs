//! Instruction catalog
//!
//! Ordered table of the instructions exercised by the test programs, covering RV32I/RV64I,
//! RV32M/RV64M, RV32F/RV32D and RV64F/RV64D.  Conditional branches appear twice: once with
//! operands that make the branch taken, and once, prefixed with `not_taken_`, with operands that
//! make it fall through.
//!
//! The catalog can also be read from, and dumped to, a JSON array of descriptor records.

use std::path::Path;

use riscv::{
    BranchMode::{Equal, Greater, Lower},
    NumericDomain::{Double, Integer, Single},
    OperandShape::*,
};

use crate::{GenError, InstDescriptor};

/// Start of the data window touched by load/store programs
pub const DATA_WINDOW_BASE: u64 = 0x1000_0000;

/// End of the data window touched by load/store programs
pub const DATA_WINDOW_END: u64 = 0x1008_0000;

/// File name prefix of branch programs whose branches are never taken
pub const NOT_TAKEN_PREFIX: &str = "not_taken_";

/// Returns the built-in instruction catalog
pub fn rv_catalog() -> Vec<InstDescriptor> {
    let d = InstDescriptor::new;
    let ls = |m: &str, domain| {
        InstDescriptor::new(m, LoadStore, domain).with_range(DATA_WINDOW_BASE, DATA_WINDOW_END)
    };
    let fls = |m: &str, domain| {
        InstDescriptor::new(m, FloatLoadStore, domain)
            .with_range(DATA_WINDOW_BASE, DATA_WINDOW_END)
    };
    let not_taken = |m: &str, mode| d(m, Branch(mode), Integer).with_prefix(NOT_TAKEN_PREFIX);

    vec![
        // RV32I
        d("lui", UpperImmediate, Integer),
        d("auipc", UpperImmediate, Integer),
        d("jal", Jump, Integer),
        d("jalr", IndirectJump, Integer),
        d("beq", Branch(Equal), Integer),
        d("bne", Branch(Lower), Integer),
        d("blt", Branch(Lower), Integer),
        d("bge", Branch(Greater), Integer),
        d("bltu", Branch(Lower), Integer),
        d("bgeu", Branch(Greater), Integer),
        not_taken("beq", Lower),
        not_taken("bne", Equal),
        not_taken("blt", Greater),
        not_taken("bge", Lower),
        not_taken("bltu", Greater),
        not_taken("bgeu", Lower),
        ls("lb", Integer),
        ls("lh", Integer),
        ls("lw", Integer),
        ls("lbu", Integer),
        ls("lhu", Integer),
        ls("sb", Integer),
        ls("sh", Integer),
        ls("sw", Integer),
        d("addi", RegImm, Integer),
        d("slti", RegImm, Integer),
        d("sltiu", RegImm, Integer),
        d("xori", RegImm, Integer),
        d("ori", RegImm, Integer),
        d("andi", RegImm, Integer),
        d("slli", ShiftAmount, Integer),
        d("srli", ShiftAmount, Integer),
        d("srai", ShiftAmount, Integer),
        d("add", RegReg, Integer),
        d("sub", RegReg, Integer),
        d("sll", RegReg, Integer),
        d("slt", RegReg, Integer),
        d("sltu", RegReg, Integer),
        d("xor", RegReg, Integer),
        d("srl", RegReg, Integer),
        d("sra", RegReg, Integer),
        d("or", RegReg, Integer),
        d("and", RegReg, Integer),
        d("nop", NoOperand, Integer),
        // RV64I
        ls("lwu", Integer),
        ls("ld", Integer),
        ls("sd", Integer),
        d("addiw", RegImm, Integer),
        d("slliw", ShiftAmount, Integer),
        d("srliw", ShiftAmount, Integer),
        d("sraiw", ShiftAmount, Integer),
        d("addw", RegReg, Integer),
        d("subw", RegReg, Integer),
        d("sllw", RegReg, Integer),
        d("srlw", RegReg, Integer),
        d("sraw", RegReg, Integer),
        // RV32M
        d("mul", RegReg, Integer),
        d("mulh", RegReg, Integer),
        d("mulhsu", RegReg, Integer),
        d("mulhu", RegReg, Integer),
        d("div", DivRem, Integer),
        d("divu", DivRem, Integer),
        d("rem", DivRem, Integer),
        d("remu", DivRem, Integer),
        // RV64M
        d("mulw", RegReg, Integer),
        d("divw", DivRem, Integer),
        d("divuw", DivRem, Integer),
        d("remw", DivRem, Integer),
        d("remuw", DivRem, Integer),
        // RV32F
        fls("flw", Single),
        fls("fsw", Single),
        d("fmadd.s", Fused, Single),
        d("fmsub.s", Fused, Single),
        d("fnmsub.s", Fused, Single),
        d("fnmadd.s", Fused, Single),
        d("fadd.s", RegReg, Single),
        d("fsub.s", RegReg, Single),
        d("fmul.s", RegReg, Single),
        d("fdiv.s", RegReg, Single),
        d("fsqrt.s", Unary, Single),
        d("fsgnj.s", RegReg, Single),
        d("fsgnjn.s", RegReg, Single),
        d("fsgnjx.s", RegReg, Single),
        d("fmin.s", RegReg, Single),
        d("fmax.s", RegReg, Single),
        d("fcvt.w.s", FloatToInt, Single),
        d("fcvt.wu.s", FloatToInt, Single),
        d("fmv.x.w", FloatToInt, Single),
        d("feq.s", Compare, Single),
        d("flt.s", Compare, Single),
        d("fle.s", Compare, Single),
        d("fclass.s", FloatToInt, Single),
        d("fcvt.s.w", IntToFloat, Integer),
        d("fcvt.s.wu", IntToFloat, Integer),
        d("fmv.w.x", IntToFloat, Integer),
        // RV32D
        fls("fld", Double),
        fls("fsd", Double),
        d("fmadd.d", Fused, Double),
        d("fmsub.d", Fused, Double),
        d("fnmsub.d", Fused, Double),
        d("fnmadd.d", Fused, Double),
        d("fadd.d", RegReg, Double),
        d("fsub.d", RegReg, Double),
        d("fmul.d", RegReg, Double),
        d("fdiv.d", RegReg, Double),
        d("fsqrt.d", Unary, Double),
        d("fsgnj.d", RegReg, Double),
        d("fsgnjn.d", RegReg, Double),
        d("fsgnjx.d", RegReg, Double),
        d("fmin.d", RegReg, Double),
        d("fmax.d", RegReg, Double),
        d("fcvt.s.d", Unary, Double),
        d("fcvt.d.s", Unary, Single),
        d("feq.d", Compare, Double),
        d("flt.d", Compare, Double),
        d("fle.d", Compare, Double),
        d("fclass.d", FloatToInt, Double),
        d("fcvt.w.d", FloatToInt, Double),
        d("fcvt.wu.d", FloatToInt, Double),
        d("fcvt.d.w", IntToFloat, Integer),
        d("fcvt.d.wu", IntToFloat, Integer),
        // RV64F
        d("fcvt.l.s", FloatToInt, Single),
        d("fcvt.lu.s", FloatToInt, Single),
        d("fcvt.s.l", IntToFloat, Integer),
        d("fcvt.s.lu", IntToFloat, Integer),
        // RV64D
        d("fcvt.l.d", FloatToInt, Double),
        d("fcvt.lu.d", FloatToInt, Double),
        d("fmv.x.d", FloatToInt, Double),
        d("fcvt.d.l", IntToFloat, Integer),
        d("fcvt.d.lu", IntToFloat, Integer),
        d("fmv.d.x", IntToFloat, Integer),
    ]
}

/// Parses a JSON catalog and validates every record
pub fn parse_catalog(json: &str) -> Result<Vec<InstDescriptor>, GenError> {
    let catalog: Vec<InstDescriptor> = serde_json::from_str(json)?;
    for desc in &catalog {
        desc.validate()?;
    }
    Ok(catalog)
}

/// Reads a JSON catalog file
pub fn load_catalog(path: &Path) -> Result<Vec<InstDescriptor>, GenError> {
    let json = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    parse_catalog(&json)
}

/// Serializes a catalog as a pretty-printed JSON array
pub fn catalog_to_json(catalog: &[InstDescriptor]) -> Result<String, GenError> {
    Ok(serde_json::to_string_pretty(catalog)?)
}

/// Keeps only the records whose mnemonic is listed.  An empty list keeps the whole catalog.
pub fn filter_catalog(catalog: Vec<InstDescriptor>, only: &[String]) -> Vec<InstDescriptor> {
    if only.is_empty() {
        return catalog;
    }
    catalog.into_iter().filter(|desc| only.iter().any(|m| *m == desc.mnemonic)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = rv_catalog();
        assert_eq!(catalog.len(), 131);
        for desc in &catalog {
            desc.validate().unwrap();
        }

        // Output file names never collide
        let names: HashSet<String> =
            catalog.iter().map(|desc| desc.file_name("", 1, 1, false)).collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_json_roundtrip_keeps_order() {
        let catalog = rv_catalog();
        let json = catalog_to_json(&catalog).unwrap();
        assert_eq!(parse_catalog(&json).unwrap(), catalog);
    }

    #[test]
    fn test_parse_minimal_record() {
        let json = r#"[
            {"mnemonic": "add", "shape": "reg_reg"},
            {"mnemonic": "bge", "shape": {"branch": "lower"}, "prefix": "not_taken_"},
            {"mnemonic": "lw", "shape": "load_store",
             "address_range": {"base": 268435456, "end": 268959744}}
        ]"#;
        let catalog = parse_catalog(json).unwrap();
        assert_eq!(catalog[0].domain, Integer);
        assert_eq!(catalog[1].shape, Branch(Lower));
        assert_eq!(catalog[1].file_name("", 2, 3, false), "not_taken_bge_2x3.s");
        assert_eq!(catalog[2].address_range.map(|r| r.base), Some(DATA_WINDOW_BASE));
    }

    #[test]
    fn test_parse_rejects_invalid_records() {
        assert!(matches!(parse_catalog("[{\"mnemonic\": \"lw\"}]"), Err(GenError::Catalog(_))));
        let no_range = r#"[{"mnemonic": "lw", "shape": "load_store"}]"#;
        assert!(matches!(parse_catalog(no_range), Err(GenError::InvalidRequest { .. })));
    }

    #[test]
    fn test_filter() {
        let only = vec!["beq".to_string(), "add".to_string()];
        let catalog = filter_catalog(rv_catalog(), &only);
        assert_eq!(catalog.len(), 3);
        assert_eq!(filter_catalog(rv_catalog(), &[]).len(), rv_catalog().len());
    }
}
