//! Instruction template generator
//!
//! Builds the test program of one catalog record.  The operand shape of the record selects how
//! registers are initialized and how every loop body line is produced:
//!
//! * `initialize_registers()` emits the register setup of the shape and numeric domain, and the
//!   floating-point literals it refers to.
//! * `produce_instruction_line()` emits one instance of the instruction with random operands.
//!
//! Register pools are split before generation: a few registers of the source pool are reserved
//! as destinations, so instructions never overwrite their own source operands.

use rand::{seq::index, seq::SliceRandom, Rng};
use riscv::{
    float_targets, int_targets, BranchMode, FloatLiteral, OperandShape, Reg, REG_LITERAL_BASE,
    REG_ZERO,
};
use tracing::warn;

use crate::{
    check_jump_offsets, check_labels, AsmProgram, GenError, InstDescriptor, JumpTable,
    OperandValues, BRANCH_VALUE_LIMIT, LOOP_LABEL,
};

/// Text of the loop body line emitted for records without a template
pub const NO_TEMPLATE: &str = "No template given";

/// Largest positive value of a 12-bit signed immediate
pub const MAX_IMM12: u64 = 2047;

/// Register groups of a conditional branch test: every value of the low group is smaller than
/// every value of the high group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchGroups {
    pub low: Vec<Reg>,
    pub high: Vec<Reg>,
}

/// Test program generator for one instruction descriptor
pub struct InstGenerator<'a> {
    desc: &'a InstDescriptor,
    values: OperandValues,
    src: Vec<Reg>,
    dst: Vec<Reg>,
    program: AsmProgram,
    jumps: Option<JumpTable>,
    next_hop: usize,
    branch: Option<BranchGroups>,
    generated: bool,
}

impl<'a> InstGenerator<'a> {
    /// Creates a generator with the full register pool of the descriptor's domain as source pool
    pub fn new(
        desc: &'a InstDescriptor,
        iterations: u64,
        exit_address: u64,
    ) -> Result<InstGenerator<'a>, GenError> {
        desc.validate()?;
        Ok(InstGenerator {
            desc,
            values: OperandValues::new(),
            src: desc.domain.register_file().candidates(),
            dst: Vec::new(),
            program: AsmProgram::new(iterations, exit_address),
            jumps: None,
            next_hop: 0,
            branch: None,
            generated: false,
        })
    }

    /// Moves `number` random registers from the source pool to the destination pool.  The zero
    /// register is never reserved, and at least one non-zero source register is kept.
    pub fn reserve_destination_registers<R: Rng>(
        &mut self,
        number: usize,
        rng: &mut R,
    ) -> Result<(), GenError> {
        let eligible = self.src.iter().filter(|r| !r.is_zero()).count();
        if number >= eligible {
            return Err(self.invalid(&format!(
                "cannot reserve {number} destination registers out of {eligible}"
            )));
        }

        for _ in 0..number {
            let candidates: Vec<usize> =
                (0..self.src.len()).filter(|i| !self.src[*i].is_zero()).collect();
            if let Some(&i) = candidates.choose(rng) {
                let reg = self.src.remove(i);
                self.dst.push(reg);
            }
        }
        Ok(())
    }

    /// Emits the register initialization of the descriptor's shape and domain
    pub fn initialize_registers<R: Rng>(&mut self, rng: &mut R) {
        match self.desc.shape {
            OperandShape::DivRem => self.init_positive(rng),
            OperandShape::LoadStore => {
                let bases = nonzero(&self.src);
                self.init_addresses(&bases, rng);
            }
            OperandShape::FloatLoadStore => {
                let regs = self.all_regs();
                self.init_domain(&regs, rng);
                self.init_addresses(&int_targets(), rng);
            }
            OperandShape::Jump => {
                for r in nonzero(&self.src) {
                    self.program.push_init(&format!("li {r}, 0"));
                }
            }
            OperandShape::IndirectJump => {
                for r in nonzero(&self.src) {
                    self.program.push_init(&format!("la {r}, {LOOP_LABEL}"));
                }
            }
            OperandShape::Branch(mode) => self.init_branch(mode, rng),
            _ => {
                let regs = self.all_regs();
                self.init_domain(&regs, rng);
            }
        }
    }

    /// Produces one loop body line of the descriptor's shape
    pub fn produce_instruction_line<R: Rng>(&mut self, rng: &mut R) -> Result<String, GenError> {
        let desc = self.desc;
        let m = desc.mnemonic.as_str();
        let line = match desc.shape {
            OperandShape::UpperImmediate => {
                let rd = self.pick(&nonzero(&self.all_regs()), "source", rng)?;
                format!("{m} {rd}, {}", self.values.upper_immediate(rng))
            }
            OperandShape::RegReg | OperandShape::DivRem => {
                let rd = self.pick(&self.dst, "destination", rng)?;
                let rs1 = self.pick(&self.src, "source", rng)?;
                let rs2 = self.pick(&self.src, "source", rng)?;
                format!("{m} {rd}, {rs1}, {rs2}")
            }
            OperandShape::ShiftAmount => {
                let rd = self.pick(&self.dst, "destination", rng)?;
                let rs1 = self.pick(&self.src, "source", rng)?;
                format!("{m} {rd}, {rs1}, {}", self.values.shift_amount(rng))
            }
            OperandShape::RegImm => {
                let rd = self.pick(&self.dst, "destination", rng)?;
                let rs1 = self.pick(&self.src, "source", rng)?;
                format!("{m} {rd}, {rs1}, {}", self.values.short_immediate(rng))
            }
            OperandShape::LoadStore => {
                let range = self.address_range()?;
                let rd = self.pick(&self.dst, "destination", rng)?;
                let offset = range.random_offset(rng);
                let base = self.pick(&nonzero(&self.src), "base", rng)?;
                format!("{m} {rd}, {offset}({base})")
            }
            OperandShape::FloatLoadStore => {
                let range = self.address_range()?;
                let fd = self.pick(&float_targets(), "float", rng)?;
                let offset = range.random_offset(rng);
                let base = self.pick(&int_targets(), "base", rng)?;
                format!("{m} {fd}, {offset}({base})")
            }
            OperandShape::Fused => {
                let rd = self.pick(&self.dst, "destination", rng)?;
                let rs1 = self.pick(&self.src, "source", rng)?;
                let rs2 = self.pick(&self.src, "source", rng)?;
                let rs3 = self.pick(&self.src, "source", rng)?;
                format!("{m} {rd}, {rs1}, {rs2}, {rs3}")
            }
            OperandShape::Unary => {
                let rd = self.pick(&self.dst, "destination", rng)?;
                let rs1 = self.pick(&self.src, "source", rng)?;
                format!("{m} {rd}, {rs1}")
            }
            OperandShape::Compare => {
                let xd = self.pick(&int_targets(), "integer", rng)?;
                let rs1 = self.pick(&self.all_regs(), "source", rng)?;
                let rs2 = self.pick(&self.all_regs(), "source", rng)?;
                format!("{m} {xd}, {rs1}, {rs2}")
            }
            OperandShape::FloatToInt => {
                let xd = self.pick(&int_targets(), "integer", rng)?;
                let rs1 = self.pick(&self.all_regs(), "source", rng)?;
                format!("{m} {xd}, {rs1}")
            }
            OperandShape::IntToFloat => {
                let fd = self.pick(&float_targets(), "float", rng)?;
                let rs1 = self.pick(&self.all_regs(), "source", rng)?;
                format!("{m} {fd}, {rs1}")
            }
            OperandShape::Jump => {
                let target = self.next_target()?;
                let rd = self.pick(&self.src, "source", rng)?;
                format!("{m} {rd}, {}", JumpTable::label(target))
            }
            OperandShape::IndirectJump => {
                let target = self.next_target()?;
                let rd = self.pick(&self.dst, "destination", rng)?;
                let rs1 = self.pick(&nonzero(&self.src), "source", rng)?;
                format!("{m} {rd}, {rs1}, {}", 4 * target)
            }
            OperandShape::Branch(mode) => {
                let target = self.next_target()?;
                let (rs1, rs2) = match (mode, &self.branch) {
                    (BranchMode::Lower, Some(groups)) => (
                        self.pick(&groups.low, "low group", rng)?,
                        self.pick(&groups.high, "high group", rng)?,
                    ),
                    (BranchMode::Greater, Some(groups)) => (
                        self.pick(&groups.high, "high group", rng)?,
                        self.pick(&groups.low, "low group", rng)?,
                    ),
                    (BranchMode::Equal, _) => {
                        let regs = nonzero(&self.src);
                        (self.pick(&regs, "source", rng)?, self.pick(&regs, "source", rng)?)
                    }
                    (_, None) => return Err(self.invalid("branch groups are not initialized")),
                };
                format!("{m} {rs1}, {rs2}, {}", JumpTable::label(target))
            }
            OperandShape::NoOperand => m.to_string(),
            OperandShape::Untemplated => format!("# {NO_TEMPLATE}"),
        };
        Ok(line)
    }

    /// Builds the whole program: register initialization, `count` loop body lines and, for
    /// control-flow shapes, the body labels.  The result is checked for the closed-label
    /// invariant before it is returned.
    pub fn generate<R: Rng>(&mut self, count: usize, rng: &mut R) -> Result<&AsmProgram, GenError> {
        if self.generated {
            return Err(self.invalid("program already generated"));
        }
        self.generated = true;

        let control_flow = self.desc.shape.is_control_flow();
        if self.desc.shape == OperandShape::IndirectJump && 4 * count as u64 > MAX_IMM12 {
            return Err(GenError::JumpOutOfRange {
                mnemonic: self.desc.mnemonic.clone(),
                offset: 4 * count as u64,
            });
        }
        if control_flow {
            self.jumps = Some(JumpTable::new(count, rng));
            self.next_hop = 0;
        }

        self.initialize_registers(rng);

        if self.desc.shape == OperandShape::Untemplated {
            warn!("No template given for `{}`", self.desc.mnemonic);
        }
        for i in 0..count {
            if control_flow {
                self.program.push_label(&JumpTable::label(i));
            }
            if self.desc.shape == OperandShape::Untemplated {
                self.program.push_comment(NO_TEMPLATE);
            } else {
                let line = self.produce_instruction_line(rng)?;
                self.program.push_inst(&line);
            }
        }
        if control_flow && count > 0 {
            self.program.push_label(&JumpTable::label(count));
        }

        let asm = self.program.to_asm();
        check_labels(&asm)?;
        if self.desc.shape == OperandShape::IndirectJump {
            check_jump_offsets(&asm, &self.desc.mnemonic, count)?;
        }
        Ok(&self.program)
    }

    /// Source register pool
    pub fn src_registers(&self) -> &[Reg] {
        &self.src
    }

    /// Destination register pool
    pub fn dst_registers(&self) -> &[Reg] {
        &self.dst
    }

    /// Low/high register groups of lower and greater branch tests
    pub fn branch_groups(&self) -> Option<&BranchGroups> {
        self.branch.as_ref()
    }

    /// Program built so far
    pub fn program(&self) -> &AsmProgram {
        &self.program
    }

    /// Loads a value of the descriptor's domain into every given register
    fn init_domain<R: Rng>(&mut self, regs: &[Reg], rng: &mut R) {
        match self.desc.domain.literal_load() {
            None => {
                for r in nonzero(regs) {
                    let value = self.values.narrow_width(rng);
                    self.program.push_init(&format!("li {r}, {value}"));
                }
            }
            Some(load) => {
                for r in regs {
                    let label = format!(".{r}_DATA");
                    let value = self.values.real(rng);
                    if let Some(literal) = FloatLiteral::encode(self.desc.domain, value) {
                        self.program.push_init(&format!("lui {REG_LITERAL_BASE}, %hi({label})"));
                        self.program.push_init(&format!(
                            "{load} {r}, %lo({label})({REG_LITERAL_BASE})"
                        ));
                        self.program.push_literal(&label, literal);
                    }
                }
            }
        }
    }

    /// Drops the zero register from the source pool and loads strictly positive values into the
    /// remaining source registers, so that no divisor is zero
    fn init_positive<R: Rng>(&mut self, rng: &mut R) {
        self.src.retain(|r| !r.is_zero());
        for r in self.src.clone() {
            let value = self.values.positive_divisor(rng);
            self.program.push_init(&format!("lui {r}, %hi({value})"));
            self.program.push_init(&format!("addi {r}, {r}, %lo({value})"));
        }
    }

    /// Loads a random address of the descriptor's window into every given register
    fn init_addresses<R: Rng>(&mut self, regs: &[Reg], rng: &mut R) {
        let Some(range) = self.desc.address_range else {
            return;
        };
        for r in regs {
            let value = range.random_base(rng);
            self.program.push_init(&format!("lui {r}, %hi({value})"));
            self.program.push_init(&format!("addi {r}, {r}, %lo({value})"));
        }
    }

    /// Loads the values of a conditional branch test.  Equal tests share one positive value;
    /// lower and greater tests get distinct positive values split at their median into the low
    /// group (with the zero register) and the high group.
    fn init_branch<R: Rng>(&mut self, mode: BranchMode, rng: &mut R) {
        let regs = nonzero(&self.all_regs());

        if mode == BranchMode::Equal {
            let value = rng.gen_range(1..BRANCH_VALUE_LIMIT);
            for r in &regs {
                self.program.push_init(&format!("li {r}, {value}"));
            }
            return;
        }

        let values: Vec<u64> = index::sample(rng, BRANCH_VALUE_LIMIT as usize - 1, regs.len())
            .into_iter()
            .map(|v| v as u64 + 1)
            .collect();
        let median_x2 = median_x2(&values);

        let mut groups = BranchGroups { low: vec![REG_ZERO], high: Vec::new() };
        for (r, value) in regs.iter().zip(&values) {
            self.program.push_init(&format!("li {r}, {value}"));
            if 2 * value > median_x2 {
                groups.high.push(*r);
            } else {
                groups.low.push(*r);
            }
        }
        self.branch = Some(groups);
    }

    fn next_target(&mut self) -> Result<usize, GenError> {
        let hop = self.jumps.as_ref().and_then(|table| table.hops().get(self.next_hop)).copied();
        match hop {
            Some(hop) => {
                self.next_hop += 1;
                Ok(hop.target)
            }
            None => Err(self.invalid("jump table exhausted")),
        }
    }

    fn address_range(&self) -> Result<crate::AddressRange, GenError> {
        self.desc.address_range.ok_or_else(|| self.invalid("missing address range"))
    }

    fn all_regs(&self) -> Vec<Reg> {
        self.src.iter().chain(self.dst.iter()).copied().collect()
    }

    fn pick<R: Rng>(
        &self,
        regs: &[Reg],
        pool: &'static str,
        rng: &mut R,
    ) -> Result<Reg, GenError> {
        regs.choose(rng).copied().ok_or_else(|| GenError::EmptyPool {
            mnemonic: self.desc.mnemonic.clone(),
            pool,
        })
    }

    fn invalid(&self, reason: &str) -> GenError {
        GenError::InvalidRequest {
            mnemonic: self.desc.mnemonic.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Returns the registers other than the zero register
fn nonzero(regs: &[Reg]) -> Vec<Reg> {
    regs.iter().filter(|r| !r.is_zero()).copied().collect()
}

/// Returns twice the sample median, which keeps the median of an even-sized set integral
fn median_x2(values: &[u64]) -> u64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    match n {
        0 => 0,
        _ if n % 2 == 1 => 2 * sorted[n / 2],
        _ => sorted[n / 2 - 1] + sorted[n / 2],
    }
}
