// semprobe/src/main.rs
//! Semprobe entry point.
//!
//! Parses the command line, initializes logging and the theme, then hands
//! off to the selected command. Any error is printed once and the process
//! exits with status 1.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;

use semprobe::cli::{Cli, Commands};
use semprobe::commands::{self, error_msg};
use semprobe::logger;
use semprobe::ui::theme::{build_theme_map, ThemeMap};

fn dispatch(cli: &Cli, theme_map: &ThemeMap) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::Run(cmd) => commands::run::run_experiment_command(cmd, &mut out, theme_map, cli.quiet),
        Commands::Score(cmd) => commands::score::run_score_command(cmd, &mut out, theme_map),
        Commands::Prompt(cmd) => commands::prompt::run_prompt_command(cmd, &mut out, theme_map),
        Commands::Config(cmd) => commands::config::run_config_command(cmd, &mut out),
    }
}

fn main() {
    // A missing .env file is not an error.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug, cli.disable_debug));

    let theme_map = match build_theme_map(cli.theme.as_ref()).context("Failed to load theme") {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = dispatch(&cli, &theme_map) {
        error_msg(format!("{:#}", e), &theme_map);
        std::process::exit(1);
    }
}
