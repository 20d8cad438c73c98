// semprobe/src/commands/score.rs
//! `semprobe score`: clusters and scores responses collected elsewhere.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;
use std::fs;
use std::io::{self, Read, Write};

use semprobe_core::{build_engine, split_responses};

use crate::cli::ScoreCommand;
use crate::commands::{apply_clustering_args, load_effective_config};
use crate::ui::summary;
use crate::ui::theme::ThemeMap;

fn read_input(cmd: &ScoreCommand) -> Result<String> {
    match &cmd.input_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("Failed to read responses from stdin")?;
            Ok(buffer)
        }
    }
}

pub fn run_score_command<W: Write>(cmd: &ScoreCommand, out: &mut W, theme: &ThemeMap) -> Result<()> {
    let mut config = load_effective_config(cmd.config.as_deref())?;
    apply_clustering_args(&mut config, &cmd.clustering);

    let input = read_input(cmd)?;
    let responses = split_responses(&input, cmd.delimiter.as_deref());
    info!("Scoring {} responses", responses.len());

    let engine = build_engine(&config.clustering)?;
    let estimate = engine.estimate(&responses)?;

    if cmd.json_stdout {
        serde_json::to_writer_pretty(&mut *out, &estimate)?;
        writeln!(out)?;
    } else {
        let supports_color = io::stdout().is_terminal();
        summary::print_estimate_summary(&estimate, engine.name(), out, theme, supports_color)?;
    }
    Ok(())
}
