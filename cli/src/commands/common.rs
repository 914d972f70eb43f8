use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use std::fs;
use std::path::Path;

use powergen_core::{catalog_to_json, filter_catalog, load_catalog, rv_catalog, InstDescriptor};

/// Parses an address given in decimal or, with a `0x` prefix, in hexadecimal
pub fn parse_address(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse::<u64>(),
    };
    parsed.map_err(|e| format!("'{}' is not a valid address: {}", s, e))
}

/// Returns a generator seeded with `seed`, or from OS entropy when none is given
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Returns the catalog to run: the JSON file when given, otherwise the built-in table, restricted
/// to the `only` mnemonics
pub fn get_catalog(path: Option<&Path>, only: &[String]) -> Result<Vec<InstDescriptor>> {
    let catalog = match path {
        Some(path) => load_catalog(path)
            .with_context(|| format!("Error loading catalog {}", path.display()))?,
        None => rv_catalog(),
    };

    let catalog = filter_catalog(catalog, only);
    let unknown: Vec<&String> =
        only.iter().filter(|m| !catalog.iter().any(|d| d.mnemonic == **m)).collect();
    if !unknown.is_empty() {
        tracing::warn!("Unknown mnemonics ignored: {:?}", unknown);
    }
    Ok(catalog)
}

/// Writes the catalog as JSON to `path`, or to stdout
pub fn dump_catalog(catalog: &[InstDescriptor], path: Option<&Path>) -> Result<()> {
    let json = catalog_to_json(catalog).context("Error serializing catalog")?;
    match path {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("Error writing catalog {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
