// semprobe/src/ui/mod.rs
//! Console rendering: theme, status lines and summary tables.

pub mod output_format;
pub mod summary;
pub mod theme;
