mod riscv_float;
mod riscv_inst;
mod riscv_registers;

pub use riscv_float::*;
pub use riscv_inst::*;
pub use riscv_registers::*;
