//! CLI subcommands

pub mod config;
pub mod page;
pub mod simulate;
pub mod splash;

use anyhow::{Context, Result};
use glint_core::EffectConfig;
use std::path::Path;

/// Frame length every headless command steps with
pub const FRAME: f64 = 1.0 / 60.0;

/// The configuration at `path`, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<EffectConfig> {
    match path {
        Some(p) => EffectConfig::load(p)
            .with_context(|| format!("Failed to load configuration from {}", p.display())),
        None => Ok(EffectConfig::default()),
    }
}
