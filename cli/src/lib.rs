pub mod commands;
pub mod logging;

pub const POWERGEN_VERSION_MESSAGE: &str = env!("CARGO_PKG_VERSION");
