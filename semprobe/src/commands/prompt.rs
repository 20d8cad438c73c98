// semprobe/src/commands/prompt.rs
//! `semprobe prompt`: renders one prompt without calling a model.

use anyhow::Result;
use std::io::Write;

use semprobe_core::PromptBuilder;

use crate::cli::PromptCommand;
use crate::commands::{load_effective_config, warn_msg};
use crate::ui::theme::ThemeMap;

pub fn run_prompt_command<W: Write>(cmd: &PromptCommand, out: &mut W, theme: &ThemeMap) -> Result<()> {
    let config = load_effective_config(cmd.config.as_deref())?;
    let builder = PromptBuilder::from_config(&config.prompt)?;

    let distractors = config.distractors.get(&cmd.query).map(Vec::as_slice).unwrap_or(&[]);
    if cmd.iteration == builder.distractor_iteration() && distractors.is_empty() {
        warn_msg(format!("No distractors configured for '{}'", cmd.query), theme);
    }

    let prompt = builder.build(&cmd.query, &cmd.previous, distractors, cmd.iteration)?;
    writeln!(out, "{}", prompt)?;
    Ok(())
}
