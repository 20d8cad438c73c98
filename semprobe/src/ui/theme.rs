// semprobe/src/ui/theme.rs
//! Colors for the kinds of message the CLI prints.
//!
//! A theme file is a flat YAML map from entry name to one of the 16 ANSI
//! color names, e.g. `score_value: brightmagenta`. Entries the file leaves
//! out keep their default color.

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub type ThemeMap = HashMap<ThemeEntry, AnsiColors>;

/// The logical parts of the output that can be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    Header,
    Success,
    Info,
    Warn,
    Error,
    /// Information scores in summaries.
    ScoreValue,
}

impl ThemeEntry {
    pub const ALL: [ThemeEntry; 6] = [
        ThemeEntry::Header, ThemeEntry::Success, ThemeEntry::Info,
        ThemeEntry::Warn, ThemeEntry::Error, ThemeEntry::ScoreValue,
    ];

    fn default_color(self) -> AnsiColors {
        match self {
            ThemeEntry::Header => AnsiColors::BrightCyan,
            ThemeEntry::Success => AnsiColors::Green,
            ThemeEntry::Info => AnsiColors::White,
            ThemeEntry::Warn => AnsiColors::Yellow,
            ThemeEntry::Error => AnsiColors::Red,
            ThemeEntry::ScoreValue => AnsiColors::BrightYellow,
        }
    }
}

const COLOR_NAMES: [(&str, AnsiColors); 16] = [
    ("black", AnsiColors::Black),
    ("red", AnsiColors::Red),
    ("green", AnsiColors::Green),
    ("yellow", AnsiColors::Yellow),
    ("blue", AnsiColors::Blue),
    ("magenta", AnsiColors::Magenta),
    ("cyan", AnsiColors::Cyan),
    ("white", AnsiColors::White),
    ("brightblack", AnsiColors::BrightBlack),
    ("brightred", AnsiColors::BrightRed),
    ("brightgreen", AnsiColors::BrightGreen),
    ("brightyellow", AnsiColors::BrightYellow),
    ("brightblue", AnsiColors::BrightBlue),
    ("brightmagenta", AnsiColors::BrightMagenta),
    ("brightcyan", AnsiColors::BrightCyan),
    ("brightwhite", AnsiColors::BrightWhite),
];

/// Parses a color name. Case, spaces, dashes and underscores are ignored,
/// so `Bright_Green` and `bright green` both work.
pub fn parse_color(name: &str) -> Result<AnsiColors> {
    let wanted: String = name
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .to_lowercase();
    COLOR_NAMES.iter()
        .find(|(known, _)| *known == wanted)
        .map(|(_, color)| *color)
        .with_context(|| format!(
            "Unknown theme color '{}'; expected one of: {}",
            name,
            COLOR_NAMES.map(|(known, _)| known).join(", ")
        ))
}

pub fn default_theme() -> ThemeMap {
    ThemeEntry::ALL.iter().map(|&entry| (entry, entry.default_color())).collect()
}

/// Reads a theme file and lays it over [`default_theme`].
pub fn load_theme_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read theme file {}", path.display()))?;
    let names: HashMap<ThemeEntry, String> = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse theme file {}", path.display()))?;

    let mut theme = default_theme();
    for (entry, name) in names {
        let color = parse_color(&name).with_context(|| format!("Invalid theme file {}", path.display()))?;
        theme.insert(entry, color);
    }
    Ok(theme)
}

pub fn build_theme_map(theme_path: Option<&PathBuf>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => load_theme_file(path),
        None => Ok(default_theme()),
    }
}

pub fn entry_color(theme: &ThemeMap, entry: ThemeEntry) -> Option<AnsiColors> {
    theme.get(&entry).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn theme_file(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn color_names_are_forgiving() {
        assert_eq!(parse_color("BrightGreen").unwrap(), AnsiColors::BrightGreen);
        assert_eq!(parse_color("bright_magenta").unwrap(), AnsiColors::BrightMagenta);
        assert_eq!(parse_color(" blue ").unwrap(), AnsiColors::Blue);
        assert!(parse_color("orange").is_err());
    }

    #[test]
    fn default_theme_covers_every_entry() {
        let theme = default_theme();
        for entry in ThemeEntry::ALL {
            assert!(entry_color(&theme, entry).is_some(), "{:?} has no color", entry);
        }
        assert_eq!(entry_color(&theme, ThemeEntry::Error), Some(AnsiColors::Red));
    }

    #[test]
    fn custom_theme_is_merged_with_defaults() {
        let file = theme_file("score_value: magenta\n");
        let theme = load_theme_file(file.path()).unwrap();
        assert_eq!(entry_color(&theme, ThemeEntry::ScoreValue), Some(AnsiColors::Magenta));
        assert_eq!(entry_color(&theme, ThemeEntry::Warn), Some(AnsiColors::Yellow));
    }

    #[test]
    fn unknown_color_in_theme_file_is_an_error() {
        let file = theme_file("header: orange\n");
        let err = load_theme_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("orange"));
    }
}
