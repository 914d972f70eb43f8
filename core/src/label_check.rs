//! Closed-label validation
//!
//! Checks that every local (dot-prefixed) symbol referenced by an instruction operand of a
//! generated program is defined exactly once in the same program, and that no label at all is
//! defined twice.  Directive lines (`.section`, `.word`, ...) are not scanned for references.
//!
//! Indirect jumps address their targets by numeric offset instead of by label, so they get a
//! separate check of the offset range.

use std::collections::BTreeMap;

use crate::GenError;

/// Label definitions and local symbol references of an assembly text
#[derive(Debug, Default)]
pub struct LabelIndex {
    definitions: BTreeMap<String, usize>,
    references: Vec<String>,
}

impl LabelIndex {
    /// Scans an assembly text
    pub fn scan(asm: &str) -> LabelIndex {
        let mut index = LabelIndex::default();

        for line in asm.lines() {
            // Drop comments
            let line = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line,
            };

            // A label definition starts at the first column
            let mut rest = line;
            if !line.starts_with(char::is_whitespace) {
                if let Some((label, tail)) = line.split_once(':') {
                    if is_symbol(label) {
                        *index.definitions.entry(label.to_string()).or_insert(0) += 1;
                        rest = tail;
                    }
                }
            }

            let rest = rest.trim();
            if rest.is_empty() || rest.starts_with('.') {
                continue;
            }

            // Skip the mnemonic, then collect dot-prefixed operand symbols
            let operands = rest.split_once(char::is_whitespace).map(|(_, ops)| ops).unwrap_or("");
            index.references.extend(
                operands
                    .split(|c: char| c == ',' || c == '(' || c == ')' || c.is_whitespace())
                    .filter(|tok| tok.len() > 1 && tok.starts_with('.') && is_symbol(tok))
                    .map(str::to_string),
            );
        }

        index
    }

    /// Number of times a label is defined
    pub fn definitions(&self, label: &str) -> usize {
        self.definitions.get(label).copied().unwrap_or(0)
    }

    /// Local symbols referenced by instruction operands, in program order
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Fails on the first duplicated definition or unresolved reference
    pub fn check(&self) -> Result<(), GenError> {
        if let Some((label, count)) = self.definitions.iter().find(|(_, count)| **count > 1) {
            return Err(GenError::DuplicateLabel { label: label.clone(), count: *count });
        }
        if let Some(label) = self.references.iter().find(|r| self.definitions(r) == 0) {
            return Err(GenError::UndefinedLabel(label.clone()));
        }
        Ok(())
    }
}

/// Validates the closed-label invariant of an assembly text
pub fn check_labels(asm: &str) -> Result<(), GenError> {
    LabelIndex::scan(asm).check()
}

/// Checks that every `mnemonic` line jumps to a body instruction or to the exit label, its last
/// operand being a byte offset from the loop entry: a positive multiple of 4 no larger than
/// `4 * exit`
pub fn check_jump_offsets(asm: &str, mnemonic: &str, exit: usize) -> Result<(), GenError> {
    for line in asm.lines() {
        let line = line.trim();
        let Some((m, operands)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        if m != mnemonic {
            continue;
        }
        let offset = operands.rsplit(',').next().unwrap_or("").trim();
        let valid = match offset.parse::<u64>() {
            Ok(off) => off > 0 && off % 4 == 0 && off / 4 <= exit as u64,
            Err(_) => false,
        };
        if !valid {
            return Err(GenError::BadJumpOffset {
                mnemonic: mnemonic.to_string(),
                offset: offset.to_string(),
                exit,
            });
        }
    }
    Ok(())
}

fn is_symbol(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "
        .section \".text\"
        .globl _start
_start:
        li x1, 3
        lui x15, %hi(.f0_DATA)
        flw f0, %lo(.f0_DATA)(x15)

.loop:
.label0:
        jal x5, .label1
.label1:
        addi x1, x1, -1
        bne x1, x0, .loop
end:    beq x0, x0, end
# jal x0, .nowhere
        .section .rodata
.f0_DATA:
        .word  1065353216
";

    #[test]
    fn test_scan() {
        let index = LabelIndex::scan(PROGRAM);
        assert_eq!(index.definitions("_start"), 1);
        assert_eq!(index.definitions("end"), 1);
        assert_eq!(index.definitions(".label1"), 1);
        assert_eq!(index.references(), &[".f0_DATA", ".f0_DATA", ".label1", ".loop"]);
        assert!(index.check().is_ok());
    }

    #[test]
    fn test_undefined_reference() {
        let asm = PROGRAM.replace("jal x5, .label1", "jal x5, .label2");
        match check_labels(&asm) {
            Err(GenError::UndefinedLabel(label)) => assert_eq!(label, ".label2"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_jump_offsets() {
        let body = "\n.loop:\n        jalr x5, x7, 8\n        jalr x6, x7, 4\n        j 0x1FF0\n";
        assert!(check_jump_offsets(body, "jalr", 2).is_ok());
        for bad in ["12", "6", "0", "x9"] {
            let asm = body.replace(", 8\n", &format!(", {bad}\n"));
            match check_jump_offsets(&asm, "jalr", 2) {
                Err(GenError::BadJumpOffset { offset, exit, .. }) => {
                    assert_eq!(offset, bad);
                    assert_eq!(exit, 2);
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_duplicate_definition() {
        let asm = PROGRAM.replace(".label0:", ".label1:");
        match check_labels(&asm) {
            Err(GenError::DuplicateLabel { label, count }) => {
                assert_eq!(label, ".label1");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
