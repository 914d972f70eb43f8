use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use powergen_core::{
    generate_catalog, GenSettings, DEFAULT_DESTINATIONS, DEFAULT_EXIT_ADDRESS, DEFAULT_OUTPUT_DIR,
};

use crate::commands::{dump_catalog, get_catalog, get_rng, parse_address};

/// Generates one assembly test program per catalog instruction and per
/// (iterations, instructions) pair
#[derive(Parser, Debug)]
#[command(
    name = "gen-test-programs",
    version = crate::POWERGEN_VERSION_MESSAGE,
    about = "RISC-V power characterization test program generator",
    long_about = "Generates looped RISC-V assembly programs that repeat one instruction with \
                  random operands, used to measure the energy cost of each instruction."
)]
pub struct GenTestPrograms {
    /// Loop iterations, comma separated
    #[clap(
        short,
        long,
        value_name = "ITERATIONS",
        value_delimiter = ',',
        required_unless_present = "dump_catalog"
    )]
    pub iterations: Vec<u64>,

    /// Instructions per loop, comma separated
    #[clap(
        short,
        long,
        value_name = "INSTRUCTIONS",
        value_delimiter = ',',
        required_unless_present = "dump_catalog"
    )]
    pub number: Vec<usize>,

    /// Output directory
    #[clap(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Output file name prefix
    #[clap(short, long, value_name = "PREFIX", default_value = "")]
    pub prefix: String,

    /// Log the name of every generated instruction
    #[clap(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Random seed, for reproducible programs
    #[clap(short, long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Also write the init-only program of every instruction
    #[clap(short = 'I', long, default_value_t = false)]
    pub init: bool,

    /// Number of registers reserved as destinations
    #[clap(short, long, value_name = "COUNT", default_value_t = DEFAULT_DESTINATIONS)]
    pub destinations: usize,

    /// Only generate these mnemonics, comma separated
    #[clap(short = 'f', long, value_name = "MNEMONICS", value_delimiter = ',')]
    pub only: Vec<String>,

    /// JSON instruction catalog replacing the built-in one
    #[clap(short, long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Print the active catalog as JSON, or write it to FILE, and exit
    #[clap(long, value_name = "FILE", num_args = 0..=1)]
    pub dump_catalog: Option<Option<PathBuf>>,

    /// Address jumped to when the loop is done
    #[clap(
        short = 'x',
        long,
        value_name = "ADDRESS",
        value_parser = parse_address,
        default_value_t = DEFAULT_EXIT_ADDRESS
    )]
    pub exit_address: u64,
}

impl GenTestPrograms {
    pub fn run(&self) -> Result<()> {
        let catalog = get_catalog(self.catalog.as_deref(), &self.only)?;

        if let Some(path) = &self.dump_catalog {
            return dump_catalog(&catalog, path.as_deref());
        }

        let settings = GenSettings {
            output_dir: self.output.clone(),
            prefix: self.prefix.clone(),
            destinations: self.destinations,
            emit_init: self.init,
            exit_address: self.exit_address,
            verbose: self.verbose,
        };

        tracing::info!(
            "{}",
            format!("{} Test programs", format!("{: >12}", "Command").bright_green().bold())
        );
        tracing::info!("");

        let mut rng = get_rng(self.seed);
        let written =
            generate_catalog(&catalog, &self.iterations, &self.number, &settings, &mut rng)
                .context("Error generating test programs")?;

        println!(
            "{} {} files in {}",
            format!("{: >12}", "Generated").bright_green().bold(),
            written.len(),
            self.output.display()
        );
        Ok(())
    }
}
