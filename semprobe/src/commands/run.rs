// semprobe/src/commands/run.rs
//! `semprobe run`: the full sampling experiment.

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::io::{self, Write};
use std::path::PathBuf;

use semprobe_core::config::{PromptHistory, DEFAULT_OUTPUT_FILE};
use semprobe_core::report::{write_csv_file, write_json_file, write_transcript_file};
use semprobe_core::{ChatCompletionsClient, ExperimentRunner, ProbeConfig, QueryOutcome};

use crate::cli::RunCommand;
use crate::commands::{apply_clustering_args, error_msg, info_msg, load_effective_config, success_msg};
use crate::ui::summary;
use crate::ui::theme::ThemeMap;

/// Folds the command-line overrides into the configuration.
pub fn apply_run_overrides(config: &mut ProbeConfig, cmd: &RunCommand) {
    apply_clustering_args(config, &cmd.clustering);
    if let Some(repeat) = cmd.repeat {
        config.experiment.repeat_count = repeat;
    }
    if let Some(delay) = cmd.delay_ms {
        config.experiment.request_delay_ms = delay;
    }
    if let Some(output) = &cmd.output {
        config.experiment.output_file = Some(output.clone());
    }
    if let Some(model) = &cmd.model {
        config.provider.model = model.clone();
    }
    if let Some(url) = &cmd.api_url {
        config.provider.api_url = url.clone();
    }
    if let Some(system_prompt) = &cmd.system_prompt {
        config.provider.system_prompt = Some(system_prompt.clone());
    }
    if cmd.max_tokens.is_some() {
        config.provider.max_tokens = cmd.max_tokens;
    }
    if cmd.conversation {
        config.prompt.history = PromptHistory::Conversation;
    }
    if cmd.no_distractors {
        debug!("Dropping {} distractor sets", config.distractors.len());
        config.distractors.clear();
    }
}

pub fn run_experiment_command<W: Write>(cmd: &RunCommand, out: &mut W, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let mut config = load_effective_config(cmd.config.as_deref())?;
    apply_run_overrides(&mut config, cmd);
    config.validate().context("Invalid configuration")?;

    if config.queries.is_empty() {
        bail!("No queries configured; add a 'queries' list to the configuration file.");
    }

    let client = ChatCompletionsClient::from_config(&config.provider)?;
    let runner = ExperimentRunner::from_config(&config, Box::new(client))?;

    if !quiet {
        info_msg(
            format!(
                "Running {} queries x {} samples against {} ({} clustering, threshold {})",
                config.queries.len(),
                config.experiment.repeat_count,
                config.provider.model,
                runner.engine().name(),
                runner.engine().threshold()
            ),
            theme,
        );
    }

    let total = config.queries.len();
    let report = runner.run_with_progress(&config.queries, |i, outcome| {
        if quiet {
            return;
        }
        match outcome {
            QueryOutcome::Completed(result) => success_msg(
                format!("[{}/{}] {} -> score {:.4} ({} clusters)",
                    i + 1, total, result.query, result.estimate.score, result.estimate.cluster_count()),
                theme,
            ),
            QueryOutcome::Failed { query, error } => error_msg(
                format!("[{}/{}] {} failed: {}", i + 1, total, query, error),
                theme,
            ),
        }
    });

    let csv_path = config.experiment.output_file.clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
    write_csv_file(&csv_path, &report)
        .with_context(|| format!("Failed to write CSV report {}", csv_path.display()))?;
    if !quiet {
        info_msg(format!("CSV report written to {}", csv_path.display()), theme);
    }

    if let Some(json_path) = &cmd.json_file {
        write_json_file(json_path, &report)
            .with_context(|| format!("Failed to write JSON report {}", json_path.display()))?;
        if !quiet {
            info_msg(format!("JSON report written to {}", json_path.display()), theme);
        }
    }

    if let Some(transcript_path) = &cmd.transcript {
        write_transcript_file(transcript_path, &report)
            .with_context(|| format!("Failed to write transcript {}", transcript_path.display()))?;
        if !quiet {
            info_msg(format!("Transcript written to {}", transcript_path.display()), theme);
        }
    }

    if !cmd.no_summary && !quiet {
        let supports_color = io::stdout().is_terminal();
        summary::print_report_summary(&report, out, theme, supports_color)?;
    }

    info!("Run {} complete", report.run_id);
    if report.all_failed() {
        bail!("All {} queries failed", report.outcomes.len());
    }
    Ok(())
}
