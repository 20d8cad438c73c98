// semprobe/src/commands/config.rs
//! `semprobe config`: prints the effective configuration.

use anyhow::{Context, Result};
use std::io::Write;

use crate::cli::ConfigCommand;
use crate::commands::load_effective_config;

pub fn run_config_command<W: Write>(cmd: &ConfigCommand, out: &mut W) -> Result<()> {
    let config = load_effective_config(cmd.config.as_deref())?;
    config.validate().context("The effective configuration is invalid")?;
    let yaml = config.to_yaml()?;
    out.write_all(yaml.as_bytes())?;
    Ok(())
}
