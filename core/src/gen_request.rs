//! Generation requests
//!
//! A request pairs one catalog record with one (iterations, count) combination and the run-wide
//! settings.  Running it builds the program and writes it, plus the optional init-only baseline,
//! into the output directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{AsmProgram, GenError, InstDescriptor, InstGenerator, DEFAULT_EXIT_ADDRESS};

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "test-programs";

/// Default number of registers reserved as destinations
pub const DEFAULT_DESTINATIONS: usize = 6;

/// Run-wide generation settings
#[derive(Debug, Clone)]
pub struct GenSettings {
    pub output_dir: PathBuf,
    /// Prepended to every output file name
    pub prefix: String,
    /// Number of registers reserved as destinations
    pub destinations: usize,
    /// Also write the init-only baseline program
    pub emit_init: bool,
    pub exit_address: u64,
    /// Log every instruction name at info level
    pub verbose: bool,
}

impl Default for GenSettings {
    fn default() -> Self {
        GenSettings {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            prefix: String::new(),
            destinations: DEFAULT_DESTINATIONS,
            emit_init: false,
            exit_address: DEFAULT_EXIT_ADDRESS,
            verbose: false,
        }
    }
}

/// One program to generate
pub struct GenRequest<'a> {
    pub desc: &'a InstDescriptor,
    pub iterations: u64,
    pub count: usize,
    pub settings: &'a GenSettings,
}

impl GenRequest<'_> {
    /// Builds the program of the request
    pub fn build<R: Rng>(&self, rng: &mut R) -> Result<AsmProgram, GenError> {
        let mut generator =
            InstGenerator::new(self.desc, self.iterations, self.settings.exit_address)?;
        generator.reserve_destination_registers(self.settings.destinations, rng)?;
        Ok(generator.generate(self.count, rng)?.clone())
    }

    /// Builds the program and writes it, returning the paths of the written files
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<Vec<PathBuf>, GenError> {
        if self.settings.verbose {
            info!("Instruction: {}", self.desc.mnemonic);
        } else {
            debug!("Instruction: {}", self.desc.mnemonic);
        }

        let program = self.build(rng)?;

        let mut written = Vec::new();
        let name = self.file_name(false);
        written.push(save_program(&self.settings.output_dir, &name, &program.to_asm())?);
        if self.settings.emit_init {
            let name = self.file_name(true);
            written.push(save_program(&self.settings.output_dir, &name, &program.to_init_asm())?);
        }
        Ok(written)
    }

    fn file_name(&self, init: bool) -> String {
        self.desc.file_name(&self.settings.prefix, self.iterations, self.count, init)
    }
}

/// Writes an assembly text into `dir`, creating the directory if needed
pub fn save_program(dir: &Path, name: &str, asm: &str) -> Result<PathBuf, GenError> {
    fs::create_dir_all(dir).map_err(|e| GenError::io(dir, e))?;
    let path = dir.join(name);
    fs::write(&path, asm).map_err(|e| GenError::io(&path, e))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Generates every catalog record for every (iterations, count) pair, in catalog order, and
/// returns the paths of the written files.  Records whose jump offsets cannot encode `count` are
/// skipped with a warning.
pub fn generate_catalog<R: Rng>(
    catalog: &[InstDescriptor],
    iterations: &[u64],
    counts: &[usize],
    settings: &GenSettings,
    rng: &mut R,
) -> Result<Vec<PathBuf>, GenError> {
    let mut written = Vec::new();
    for &it in iterations {
        for &count in counts {
            info!(
                "Generating {} programs of {} iterations x {} instructions into {}",
                catalog.len(),
                it,
                count,
                settings.output_dir.display()
            );
            for desc in catalog {
                let request = GenRequest { desc, iterations: it, count, settings };
                match request.run(rng) {
                    Ok(paths) => written.extend(paths),
                    // The count does not fit this instruction, the rest of the catalog still runs
                    Err(e @ GenError::JumpOutOfRange { .. }) => {
                        let name = desc.file_name(&settings.prefix, it, count, false);
                        warn!("Skipping {}: {}", name, e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(written)
}
