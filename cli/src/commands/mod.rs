mod common;
mod gen_test_programs;

pub use common::*;
pub use gen_test_programs::*;
