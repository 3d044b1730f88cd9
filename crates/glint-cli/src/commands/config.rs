//! Config command

use super::load_config;
use anyhow::Result;
use std::path::Path;

pub fn run(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
