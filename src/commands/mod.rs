pub mod parse;
pub mod run;
pub mod shell;
pub mod tokens;

use std::fs;
use log::debug;

pub(crate) fn read_source(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    debug!("Reading {}", path);
    Ok(fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?)
}
