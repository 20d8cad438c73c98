// semprobe/src/cli.rs
//! This file defines the command-line interface (CLI) for the semprobe application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use semprobe_core::ClusteringStrategy;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "semprobe",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Probe how consistently a language model answers the same question",
    long_about = "Semprobe asks a chat model the same question several times in a row, feeding earlier answers (and optionally planted wrong answers) back into the prompt. The answers are grouped into clusters of equivalent responses, and the cluster-size distribution is summarized as an information score: 0 means the answers split evenly across clusters, larger values mean one answer dominates.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG to DEBUG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Explicitly disable debug logging, even if RUST_LOG is set to DEBUG
    #[arg(long = "disable-debug", global = true, help = "Disable debug logging, overriding RUST_LOG.")]
    pub disable_debug: bool,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `semprobe` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs the sampling experiment against the configured chat model.
    #[command(about = "Run the sampling experiment against the configured chat model.")]
    Run(RunCommand),

    /// Clusters and scores responses that were already collected.
    #[command(about = "Cluster and score already collected responses (offline).")]
    Score(ScoreCommand),

    /// Renders the prompt for one iteration without calling a model.
    #[command(about = "Render the prompt for one iteration without calling a model.")]
    Prompt(PromptCommand),

    /// Prints the effective configuration.
    #[command(about = "Print the effective configuration as YAML.")]
    Config(ConfigCommand),
}

/// Clustering strategy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    /// Fuzzy edit-distance ratio (threshold is a percentage, 0-100).
    Lexical,
    /// Embedding cosine similarity (threshold is a cosine, -1 to 1).
    Semantic,
    /// Exact string equality.
    Exact,
}

impl From<StrategyChoice> for ClusteringStrategy {
    fn from(choice: StrategyChoice) -> Self {
        match choice {
            StrategyChoice::Lexical => ClusteringStrategy::Lexical,
            StrategyChoice::Semantic => ClusteringStrategy::Semantic,
            StrategyChoice::Exact => ClusteringStrategy::Exact,
        }
    }
}

/// Arguments shared by commands that cluster responses.
#[derive(Args, Debug, Clone, Default)]
pub struct ClusteringArgs {
    /// Override the clustering strategy from the configuration.
    #[arg(long, short = 's', value_enum, help = "Clustering strategy (overrides the configuration).")]
    pub strategy: Option<StrategyChoice>,

    /// Override the threshold of the active strategy.
    #[arg(long, short = 't', allow_negative_numbers = true, help = "Similarity threshold for the active strategy (lexical: 0-100, semantic: -1 to 1).")]
    pub threshold: Option<f64>,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunCommand {
    /// Path to a configuration file (YAML).
    #[arg(long = "config", short = 'c', value_name = "FILE", help = "Configuration file (YAML) or name, merged over the built-in defaults.")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub clustering: ClusteringArgs,

    /// Number of sequential samples per query.
    #[arg(long, short = 'n', value_name = "N", help = "Number of sequential samples per query.")]
    pub repeat: Option<usize>,

    /// Pause after each model call, in milliseconds.
    #[arg(long = "delay-ms", value_name = "MS", help = "Pause after each model call, in milliseconds.")]
    pub delay_ms: Option<u64>,

    /// Write the CSV report to this file.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write the CSV report to this file.")]
    pub output: Option<PathBuf>,

    /// Also write the full JSON report to this file.
    #[arg(long = "json-file", value_name = "FILE", help = "Also write the full JSON report (clusters included) to this file.")]
    pub json_file: Option<PathBuf>,

    /// Write every exchanged message as JSON Lines.
    #[arg(long, value_name = "FILE", help = "Write the conversation transcript (one JSON message per line) to this file.")]
    pub transcript: Option<PathBuf>,

    /// System message sent ahead of every prompt.
    #[arg(long = "system-prompt", value_name = "TEXT", help = "System message sent ahead of every prompt (overrides the configuration).")]
    pub system_prompt: Option<String>,

    #[arg(long = "max-tokens", value_name = "N", help = "Upper bound on the length of each reply.")]
    pub max_tokens: Option<u32>,

    /// Send earlier answers as chat turns instead of folding them into the prompt.
    #[arg(long, help = "Send earlier prompts and answers as user/assistant turns.")]
    pub conversation: bool,

    /// Do not plant distractor answers.
    #[arg(long = "no-distractors", help = "Do not plant distractor answers.")]
    pub no_distractors: bool,

    /// Suppress the summary table.
    #[arg(long = "no-summary", help = "Suppress the summary table.")]
    pub no_summary: bool,

    /// Override the chat model name.
    #[arg(long, value_name = "NAME", help = "Chat model name (overrides the configuration).")]
    pub model: Option<String>,

    /// Override the chat completions endpoint.
    #[arg(long = "api-url", value_name = "URL", env = "SEMPROBE_API_URL", help = "Chat completions endpoint URL (overrides the configuration).")]
    pub api_url: Option<String>,
}

/// Arguments for the `score` command.
#[derive(Parser, Debug)]
pub struct ScoreCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read responses from a file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Split the input on this delimiter instead of on lines.
    #[arg(long, value_name = "DELIM", help = "Split responses on this delimiter instead of one per line (e.g. '|').")]
    pub delimiter: Option<String>,

    /// Path to a configuration file (YAML).
    #[arg(long = "config", short = 'c', value_name = "FILE", help = "Path to a configuration file (YAML) providing clustering settings.")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub clustering: ClusteringArgs,

    /// Print the estimate as JSON on stdout.
    #[arg(long = "json-stdout", help = "Print the estimate as JSON on stdout instead of a table.")]
    pub json_stdout: bool,
}

/// Arguments for the `prompt` command.
#[derive(Parser, Debug)]
pub struct PromptCommand {
    /// The question to render a prompt for.
    #[arg(long, value_name = "TEXT", help = "The question to render a prompt for.")]
    pub query: String,

    /// Zero-based iteration number.
    #[arg(long, default_value_t = 0, help = "Zero-based iteration number (distractors are planted at the configured iteration).")]
    pub iteration: usize,

    /// Earlier answers, oldest first.
    #[arg(long = "previous", value_name = "ANSWER", help = "An earlier answer; repeat the flag for several, oldest first.")]
    pub previous: Vec<String>,

    /// Path to a configuration file (YAML).
    #[arg(long = "config", short = 'c', value_name = "FILE", help = "Path to a configuration file (YAML) providing the template and distractors.")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `config` command.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Path to a configuration file (YAML).
    #[arg(long = "config", short = 'c', value_name = "FILE", help = "Configuration file (YAML) or name, merged over the built-in defaults.")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_score_with_negative_threshold() {
        let cli = Cli::try_parse_from(["semprobe", "score", "--strategy", "semantic", "--threshold", "-0.2"]).unwrap();
        match cli.command {
            Commands::Score(cmd) => {
                assert_eq!(cmd.clustering.strategy, Some(StrategyChoice::Semantic));
                assert_eq!(cmd.clustering.threshold, Some(-0.2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_repeated_previous_answers() {
        let cli = Cli::try_parse_from([
            "semprobe", "prompt", "--query", "Q?", "--previous", "a", "--previous", "b",
        ]).unwrap();
        match cli.command {
            Commands::Prompt(cmd) => assert_eq!(cmd.previous, vec!["a", "b"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
