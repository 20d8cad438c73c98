// semprobe-core/src/prompt.rs
//! Builds the prompt for each iteration of a query's sampling loop.
//!
//! The prompt restates the question, optionally plants distractor answers at
//! one configured iteration, folds in earlier answers from the same loop and
//! asks the question again. Templates are rendered with `tinytemplate` using
//! the unescaped formatter, since prompts are plain text.
//!
//! License: MIT OR Apache-2.0

use log::debug;
use serde::Serialize;
use tinytemplate::{format_unescaped, TinyTemplate};

use crate::config::{PromptConfig, PromptHistory, DEFAULT_DISTRACTOR_ITERATION};
use crate::errors::ProbeError;

const TEMPLATE_NAME: &str = "prompt";

/// The built-in prompt. Context fields: `query`, `distractors`, `previous`,
/// `iteration` and `all_history`.
///
/// With `history: all` earlier answers are listed without a colon after
/// "is", the wording of the accumulate-everything prompt this mode
/// reproduces. Distractors and the `last` history keep the colon.
pub const DEFAULT_TEMPLATE: &str = "Consider the following question:\nQ: {query}\n\
{{ for answer in distractors }}Another answer to question Q is: {answer}\n{{ endfor }}\
{{ if all_history }}{{ for answer in previous }}Another answer to question Q is {answer}\n{{ endfor }}\
{{ else }}{{ for answer in previous }}Another answer to question Q is: {answer}\n{{ endfor }}{{ endif }}\
Provide an answer to the following question:\nQ: {query}\nA:";

#[derive(Serialize)]
struct PromptContext<'a> {
    query: &'a str,
    distractors: &'a [String],
    previous: &'a [String],
    iteration: usize,
    all_history: bool,
}

/// Renders prompts from a template, a history mode and the distractor
/// injection point.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
    history: PromptHistory,
    distractor_iteration: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            history: PromptHistory::Last,
            distractor_iteration: DEFAULT_DISTRACTOR_ITERATION,
        }
    }
}

impl PromptBuilder {
    pub fn new(
        template: Option<String>,
        history: PromptHistory,
        distractor_iteration: usize,
    ) -> Result<Self, ProbeError> {
        let template = template.unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        Self::check_template(&template)?;
        Ok(Self { template, history, distractor_iteration })
    }

    pub fn from_config(config: &PromptConfig) -> Result<Self, ProbeError> {
        Self::new(config.template.clone(), config.history, config.distractor_iteration)
    }

    /// Fails with `InvalidConfiguration` if `template` does not parse.
    pub fn check_template(template: &str) -> Result<(), ProbeError> {
        let mut tt = TinyTemplate::new();
        tt.add_template(TEMPLATE_NAME, template)
            .map_err(|e| ProbeError::InvalidConfiguration(format!("Failed to parse prompt template: {}", e)))?;
        Ok(())
    }

    pub fn distractor_iteration(&self) -> usize {
        self.distractor_iteration
    }

    pub fn history(&self) -> PromptHistory {
        self.history
    }

    /// Renders the prompt for `iteration` (zero-based).
    ///
    /// `responses` are the answers collected so far for this query, oldest
    /// first. In conversation mode they are left out of the text because the
    /// caller sends them as separate turns. `distractors` are the planted answers for this query; they are
    /// only included when `iteration` equals the configured injection point.
    pub fn build(
        &self,
        query: &str,
        responses: &[String],
        distractors: &[String],
        iteration: usize,
    ) -> Result<String, ProbeError> {
        if query.trim().is_empty() {
            return Err(ProbeError::InvalidInput("query must not be empty".to_string()));
        }

        let distractors: &[String] = if iteration == self.distractor_iteration { distractors } else { &[] };
        let previous: &[String] = match self.history {
            PromptHistory::Last => &responses[responses.len().saturating_sub(1)..],
            PromptHistory::All => responses,
            PromptHistory::Conversation => &[],
        };

        let mut tt = TinyTemplate::new();
        tt.set_default_formatter(&format_unescaped);
        tt.add_template(TEMPLATE_NAME, &self.template)
            .map_err(|e| ProbeError::TemplateError(e.to_string()))?;

        let all_history = self.history == PromptHistory::All;
        let ctx = PromptContext { query, distractors, previous, iteration, all_history };
        let prompt = tt.render(TEMPLATE_NAME, &ctx)
            .map_err(|e| ProbeError::TemplateError(e.to_string()))?;

        debug!("Prompt for iteration {}:\n{}", iteration, prompt);
        Ok(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    const QUERY: &str = "What is the capital of the U.K.?";

    #[test]
    fn test_first_iteration_has_no_context() {
        let prompt = PromptBuilder::default().build(QUERY, &[], &strings(&["Paris."]), 0).unwrap();
        assert_eq!(
            prompt,
            "Consider the following question:\nQ: What is the capital of the U.K.?\n\
             Provide an answer to the following question:\nQ: What is the capital of the U.K.?\nA:"
        );
    }

    #[test]
    fn test_distractor_injected_before_previous_answer() {
        let prompt = PromptBuilder::default()
            .build(QUERY, &strings(&["London."]), &strings(&["The capital of the U.K. is Paris."]), 1)
            .unwrap();
        assert_eq!(
            prompt,
            "Consider the following question:\nQ: What is the capital of the U.K.?\n\
             Another answer to question Q is: The capital of the U.K. is Paris.\n\
             Another answer to question Q is: London.\n\
             Provide an answer to the following question:\nQ: What is the capital of the U.K.?\nA:"
        );
    }

    #[test]
    fn test_last_history_keeps_only_latest_answer() {
        let prompt = PromptBuilder::default()
            .build(QUERY, &strings(&["London.", "Paris."]), &strings(&["Rome."]), 2)
            .unwrap();
        assert!(prompt.contains("Another answer to question Q is: Paris.\n"));
        assert!(!prompt.contains("London."));
        assert!(!prompt.contains("Rome."));
    }

    #[test]
    fn test_all_history_keeps_every_answer() {
        let builder = PromptBuilder::new(None, PromptHistory::All, 1).unwrap();
        let prompt = builder.build(QUERY, &strings(&["London.", "Paris."]), &[], 2).unwrap();
        assert_eq!(prompt.matches("Another answer to question Q is ").count(), 2);
        assert!(prompt.find("London.").unwrap() < prompt.find("Paris.").unwrap());
    }

    #[test]
    fn test_all_history_lines_have_no_colon() {
        let builder = PromptBuilder::new(None, PromptHistory::All, 1).unwrap();
        let prompt = builder
            .build(QUERY, &strings(&["London."]), &strings(&["The capital of the U.K. is Paris."]), 1)
            .unwrap();
        assert_eq!(
            prompt,
            "Consider the following question:\nQ: What is the capital of the U.K.?\n\
             Another answer to question Q is: The capital of the U.K. is Paris.\n\
             Another answer to question Q is London.\n\
             Provide an answer to the following question:\nQ: What is the capital of the U.K.?\nA:"
        );
    }

    #[test]
    fn test_conversation_history_keeps_answers_out_of_the_text() {
        let builder = PromptBuilder::new(None, PromptHistory::Conversation, 1).unwrap();
        let prompt = builder
            .build(QUERY, &strings(&["London."]), &strings(&["The capital of the U.K. is Paris."]), 1)
            .unwrap();
        assert!(prompt.contains("Another answer to question Q is: The capital of the U.K. is Paris.\n"));
        assert!(!prompt.contains("London."));
    }

    #[test]
    fn test_apostrophes_are_not_escaped() {
        let query = "If Monday's child is fair of face, what is Saturday's child?";
        let prompt = PromptBuilder::default().build(query, &[], &[], 0).unwrap();
        assert!(prompt.contains("Monday's child"));
    }

    #[test]
    fn test_custom_template() {
        let builder = PromptBuilder::new(Some("{query} #{iteration}".to_string()), PromptHistory::Last, 1).unwrap();
        assert_eq!(builder.build("Q?", &[], &[], 3).unwrap(), "Q? #3");
    }

    #[test]
    fn test_invalid_template_is_configuration_error() {
        let err = PromptBuilder::new(Some("{{ for x in items }}never closed".to_string()), PromptHistory::Last, 1).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let err = PromptBuilder::default().build("  ", &[], &[], 0).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidInput(_)));
    }
}
