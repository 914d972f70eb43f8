//! Contains the test program generator used to characterize the power consumption of RISC-V
//! instructions: instruction catalog, register initialization, loop body templates and
//! program assembly
mod asm_program;
mod gen_error;
mod gen_request;
mod inst_catalog;
mod inst_descriptor;
mod inst_generator;
mod jump_table;
mod label_check;
mod operand_values;

pub use asm_program::*;
pub use gen_error::*;
pub use gen_request::*;
pub use inst_catalog::*;
pub use inst_descriptor::*;
pub use inst_generator::*;
pub use jump_table::*;
pub use label_check::*;
pub use operand_values::*;
