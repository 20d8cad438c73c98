// semprobe-core/tests/config_integration_tests.rs
use anyhow::Result;
use tempfile::NamedTempFile;
use std::io::Write;

use semprobe_core::config::{self, ClusteringStrategy, EmbeddingProviderKind, ProbeConfig, PromptHistory};

fn write_yaml(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

#[test]
fn test_load_default_config() {
    let config = ProbeConfig::load_default_config().unwrap();
    assert_eq!(config.queries[0], "What is the capital of the U.K.?");
    assert_eq!(
        config.distractors["What is the capital of the U.K.?"],
        vec!["The capital of the U.K. is Paris.".to_string()]
    );
    assert_eq!(config.provider.model, "deepseek-chat");
    assert_eq!(config.experiment.request_delay_ms, 1200);
    assert_eq!(config.prompt.distractor_iteration, 1);
    assert_eq!(config.prompt.history, PromptHistory::Last);
    assert!(config.experiment.error_placeholder.is_none());
}

#[test]
fn test_load_multi_label_config() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/multi_label.yaml");
    let config = ProbeConfig::load_from_file(path)?;
    assert_eq!(config.clustering.strategy, ClusteringStrategy::Semantic);
    assert_eq!(config.clustering.active_threshold(), 0.7);
    assert_eq!(config.queries.len(), 4);
    assert_eq!(config.distractors["Name a yellow fruit?"], vec!["Strawberry.".to_string()]);
    // Sections missing from the file fall back to their defaults.
    assert_eq!(config.experiment.repeat_count, 10);
    Ok(())
}

#[test]
fn test_load_from_file_partial_sections() -> Result<()> {
    let file = write_yaml(r#"
experiment:
  repeat_count: 3
  error_placeholder: "ERROR"
clustering:
  strategy: semantic
  semantic:
    embedding:
      provider: hashing
      dimension: 64
prompt:
  history: all
queries:
  - "Name a city in the UK?"
"#)?;
    let config = ProbeConfig::load_from_file(file.path())?;
    assert_eq!(config.experiment.repeat_count, 3);
    assert_eq!(config.experiment.request_delay_ms, 1200);
    assert_eq!(config.experiment.error_placeholder.as_deref(), Some("ERROR"));
    assert_eq!(config.clustering.semantic.effective_threshold(), 0.7);
    assert_eq!(config.clustering.semantic.embedding.provider, EmbeddingProviderKind::Hashing);
    assert_eq!(config.clustering.semantic.embedding.dimension, Some(64));
    assert_eq!(config.prompt.history, PromptHistory::All);
    assert_eq!(config.prompt.distractor_iteration, 1);
    assert!(config.distractors.is_empty());
    Ok(())
}

#[test]
fn test_load_from_file_rejects_semantic_percentage_threshold() -> Result<()> {
    let file = write_yaml(r#"
clustering:
  strategy: semantic
  semantic:
    threshold: 85
"#)?;
    let err = ProbeConfig::load_from_file(file.path()).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("semantic threshold"), "unexpected error: {}", message);
    Ok(())
}

#[test]
fn test_load_from_file_rejects_zero_repeat_count() -> Result<()> {
    let file = write_yaml("experiment:\n  repeat_count: 0\n")?;
    assert!(ProbeConfig::load_from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn test_load_from_file_rejects_unknown_strategy() -> Result<()> {
    let file = write_yaml("clustering:\n  strategy: phonetic\n")?;
    assert!(ProbeConfig::load_from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn test_merge_user_queries_replace_defaults() -> Result<()> {
    let default_config = ProbeConfig::load_default_config()?;
    let file = write_yaml(r#"
queries:
  - "Name a yellow fruit?"
distractors:
  "Name a yellow fruit?":
    - "Strawberry."
"#)?;
    let user_config = ProbeConfig::load_from_file(file.path())?;
    let merged = config::merge_config(default_config, Some(user_config));

    assert_eq!(merged.queries, vec!["Name a yellow fruit?".to_string()]);
    assert_eq!(merged.distractors.len(), 1);
    assert!(merged.orphan_distractors().is_empty());
    Ok(())
}

#[test]
fn test_merge_without_queries_keeps_defaults_and_merges_distractors() -> Result<()> {
    let default_config = ProbeConfig::load_default_config()?;
    let default_count = default_config.distractors.len();
    let file = write_yaml(r#"
clustering:
  strategy: exact
distractors:
  "Who was the first US president?":
    - "The first US president was Thomas Jefferson."
"#)?;
    let user_config = ProbeConfig::load_from_file(file.path())?;
    let merged = config::merge_config(default_config, Some(user_config));

    assert_eq!(merged.queries.len(), 8);
    assert_eq!(merged.distractors.len(), default_count);
    assert_eq!(
        merged.distractors["Who was the first US president?"],
        vec!["The first US president was Thomas Jefferson.".to_string()]
    );
    assert_eq!(merged.clustering.strategy, ClusteringStrategy::Exact);
    Ok(())
}

#[test]
fn test_merge_absent_sections_match_built_in_values() -> Result<()> {
    let default_config = ProbeConfig::load_default_config()?;
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/multi_label.yaml");
    let user_config = ProbeConfig::load_from_file(path)?;
    let merged = config::merge_config(default_config.clone(), Some(user_config));

    // multi_label.yaml only carries clustering, queries and distractors.
    assert_eq!(merged.provider, default_config.provider);
    assert_eq!(merged.experiment, default_config.experiment);
    assert_eq!(merged.prompt, default_config.prompt);
    assert_eq!(
        merged.experiment.output_file.as_deref(),
        Some(std::path::Path::new(config::DEFAULT_OUTPUT_FILE))
    );
    assert_eq!(merged.clustering.lexical.threshold, Some(85.0));
    assert_eq!(merged.clustering.semantic.embedding.dimension, Some(256));

    let yaml = merged.to_yaml()?;
    assert!(!yaml.contains("threshold: null"), "yaml was: {}", yaml);
    Ok(())
}

#[test]
fn test_merge_without_user_config_is_identity() -> Result<()> {
    let default_config = ProbeConfig::load_default_config()?;
    let merged = config::merge_config(default_config.clone(), None);
    assert_eq!(merged, default_config);
    Ok(())
}

#[test]
fn test_yaml_round_trip_keeps_thresholds() -> Result<()> {
    let default_config = ProbeConfig::load_default_config()?;
    let yaml = default_config.to_yaml()?;
    let file = write_yaml(&yaml)?;
    let reloaded = ProbeConfig::load_from_file(file.path())?;
    assert_eq!(reloaded, default_config);
    Ok(())
}

#[test]
fn test_config_candidate_paths_end_in_yaml() {
    let paths = config::config_candidate_paths("multi_label");
    assert!(!paths.is_empty());
    assert!(paths.iter().all(|p| p.ends_with("multi_label.yaml")));
}

#[test]
fn test_load_config_by_name_accepts_path() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/multi_label.yaml");
    let config = config::load_config_by_name(path)?;
    assert_eq!(config.queries.len(), 4);
    assert!(config::load_config_by_name("definitely-not-a-config-name").is_err());
    Ok(())
}
