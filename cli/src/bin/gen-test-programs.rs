use anyhow::{Context, Result};
use clap::Parser;
use powergen_cli::{commands::GenTestPrograms, logging};

fn main() -> Result<()> {
    // Parse command-line arguments and handle errors if they occur.
    let args = GenTestPrograms::parse();

    logging::init()?;

    args.run().context("Error executing gen-test-programs")?;

    Ok(())
}
