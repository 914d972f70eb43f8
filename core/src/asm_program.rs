//! Assembly program buffer
//!
//! A test program is assembled from append-only sections rendered in a fixed order:
//! ```text
//!         .section ".text"            header, loads the iteration counter into x1
//!         ...                         register initialization
//! .loop:                              loop entry
//!         ...                         N instruction lines under test
//!         addi x1, x1, -1             loop control and halt
//!         ...
//!         .section .rodata            floating-point literals
//! ```
//! The same buffer renders the full program and the init-only baseline program, which keeps the
//! header, the initialization, the footer and the literals but leaves the loop body empty.

use riscv::{FloatLiteral, REG_LOOP_COUNTER, REG_ZERO};

/// Label of the loop entry
pub const LOOP_LABEL: &str = ".loop";

/// Address the program jumps to when the loop is done.  The simulation testbench detects the
/// end of the run when the fetch address reaches it.
pub const DEFAULT_EXIT_ADDRESS: u64 = 0x1FF0;

/// Indentation of every instruction and directive line
pub const INDENT: &str = "        ";

/// Section-ordered assembly text of one test program
#[derive(Debug, Clone, Default)]
pub struct AsmProgram {
    iterations: u64,
    exit_address: u64,
    init: String,
    body: String,
    body_insts: usize,
    rodata: String,
}

impl AsmProgram {
    pub fn new(iterations: u64, exit_address: u64) -> Self {
        AsmProgram { iterations, exit_address, ..Default::default() }
    }

    /// Appends a register initialization instruction
    pub fn push_init(&mut self, inst: &str) {
        self.init += INDENT;
        self.init += inst;
        self.init += "\n";
    }

    /// Appends an instruction to the loop body
    pub fn push_inst(&mut self, inst: &str) {
        self.body += INDENT;
        self.body += inst;
        self.body += "\n";
        self.body_insts += 1;
    }

    /// Appends a comment line to the loop body.  It takes the place of one instruction.
    pub fn push_comment(&mut self, comment: &str) {
        self.body += "# ";
        self.body += comment;
        self.body += "\n";
        self.body_insts += 1;
    }

    /// Defines a label inside the loop body
    pub fn push_label(&mut self, label: &str) {
        self.body += label;
        self.body += ":\n";
    }

    /// Appends a floating-point literal to the read-only data section
    pub fn push_literal(&mut self, label: &str, literal: FloatLiteral) {
        self.rodata += &format!("{INDENT}.align  {}\n", literal.align());
        self.rodata += label;
        self.rodata += ":\n";
        for word in literal.words() {
            self.rodata += &format!("{INDENT}.word  {word}\n");
        }
    }

    /// Number of instruction lines in the loop body
    pub fn body_insts(&self) -> usize {
        self.body_insts
    }

    /// Renders the full test program
    pub fn to_asm(&self) -> String {
        let mut code = String::new();
        self.render(&mut code, true);
        code
    }

    /// Renders the init-only baseline program
    pub fn to_init_asm(&self) -> String {
        let mut code = String::new();
        self.render(&mut code, false);
        code
    }

    fn render(&self, code: &mut String, with_body: bool) {
        // Header
        *code += "\n";
        *code += &format!("{INDENT}.section \".text\"\n");
        *code += &format!("{INDENT}.globl _start\n");
        *code += "_start:\n";
        *code += &format!("{INDENT}li {REG_LOOP_COUNTER}, {}\n", self.iterations);

        // Register initialization
        *code += &self.init;

        // Loop body
        *code += &format!("\n{LOOP_LABEL}:\n");
        if with_body {
            *code += &self.body;
        }

        // Loop control and halt
        *code += &format!("{INDENT}addi {REG_LOOP_COUNTER}, {REG_LOOP_COUNTER}, -1\n");
        *code += &format!("{INDENT}bne {REG_LOOP_COUNTER}, {REG_ZERO}, {LOOP_LABEL}\n");
        *code += &format!("{INDENT}j {:#X}\n", self.exit_address);
        *code += &format!("end:    beq {REG_ZERO}, {REG_ZERO}, end\n");

        // Literals
        *code += "\n";
        *code += &format!("{INDENT}.section .rodata\n");
        *code += &format!("{INDENT}.align  2\n");
        *code += &self.rodata;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_order() {
        let mut program = AsmProgram::new(100, DEFAULT_EXIT_ADDRESS);
        program.push_literal(".f1_DATA", FloatLiteral::Single(0x3f80_0000));
        program.push_inst("add x3, x4, x5");
        program.push_init("li x4, 7");

        let asm = program.to_asm();
        let header = asm.find("li x1, 100").unwrap();
        let init = asm.find("li x4, 7").unwrap();
        let lp = asm.find(".loop:").unwrap();
        let body = asm.find("add x3, x4, x5").unwrap();
        let footer = asm.find("addi x1, x1, -1").unwrap();
        let rodata = asm.find(".f1_DATA:").unwrap();
        assert!(header < init && init < lp && lp < body && body < footer && footer < rodata);
        assert!(asm.contains("        j 0x1FF0\n"));
        assert!(asm.contains("        .word  1065353216\n"));
        assert_eq!(program.body_insts(), 1);
    }

    #[test]
    fn test_init_only_drops_body() {
        let mut program = AsmProgram::new(10, 0x2000);
        program.push_init("li x4, 7");
        program.push_label(".label0");
        program.push_inst("jal x4, .label1");
        program.push_label(".label1");

        let init = program.to_init_asm();
        assert!(init.contains("li x4, 7"));
        assert!(init.contains(".loop:\n        addi x1, x1, -1"));
        assert!(!init.contains(".label0"));
        assert!(init.contains("j 0x2000"));
    }

    #[test]
    fn test_double_literal_alignment() {
        let mut program = AsmProgram::new(1, DEFAULT_EXIT_ADDRESS);
        program.push_literal(".f2_DATA", FloatLiteral::Double(0x3ff0_0000_0000_0000));
        let asm = program.to_asm();
        let expected =
            "        .align  3\n.f2_DATA:\n        .word  0\n        .word  1072693248\n";
        assert!(asm.contains(expected));
    }
}
