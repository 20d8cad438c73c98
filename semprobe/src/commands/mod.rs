// semprobe/src/commands/mod.rs
//! Command implementations and the helpers they share.

pub mod config;
pub mod prompt;
pub mod run;
pub mod score;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::debug;
use std::io;
use std::path::Path;

use semprobe_core::{load_config_by_name, merge_config, ProbeConfig};

use crate::cli::ClusteringArgs;
use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing success messages to stderr.
pub fn success_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_success_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_error_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_warn_message(&mut io::stderr(), msg.as_ref(), theme, stderr_supports_color);
}

/// The built-in configuration, with `path` merged over it when given.
/// `path` may also be a bare name such as `multi_label`, which is looked up
/// in the standard configuration directories.
pub fn load_effective_config(path: Option<&Path>) -> Result<ProbeConfig> {
    let defaults = ProbeConfig::load_default_config()?;
    let user = match path {
        Some(p) => Some(
            load_config_by_name(&p.to_string_lossy())
                .with_context(|| format!("Failed to load configuration '{}'", p.display()))?,
        ),
        None => None,
    };
    let config = merge_config(defaults, user);
    debug!("Effective configuration: {} queries, strategy {}", config.queries.len(), config.clustering.strategy);
    Ok(config)
}

/// Applies `--strategy` then `--threshold`, so the threshold lands on the
/// strategy that will actually run.
pub fn apply_clustering_args(config: &mut ProbeConfig, args: &ClusteringArgs) {
    if let Some(strategy) = args.strategy {
        config.clustering.strategy = strategy.into();
    }
    if let Some(threshold) = args.threshold {
        config.clustering.set_active_threshold(threshold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StrategyChoice;
    use semprobe_core::ClusteringStrategy;

    #[test]
    fn threshold_follows_strategy_override() {
        let mut config = load_effective_config(None).unwrap();
        let args = ClusteringArgs { strategy: Some(StrategyChoice::Semantic), threshold: Some(0.9) };
        apply_clustering_args(&mut config, &args);
        assert_eq!(config.clustering.strategy, ClusteringStrategy::Semantic);
        assert_eq!(config.clustering.semantic.threshold, Some(0.9));
        assert_eq!(config.clustering.lexical.threshold, Some(85.0));
    }
}
