// semprobe/src/logger.rs
//! Logger set-up for the `semprobe` binary.
//!
//! Log lines go to stderr as `[LEVEL target] message`. `RUST_LOG` is honoured
//! unless the caller passes an explicit level (from `--quiet`, `--debug` or
//! `--disable-debug`).

use std::io::Write;

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Maps the global flags to a level override. `None` defers to `RUST_LOG`.
pub fn level_from_flags(quiet: bool, debug: bool, disable_debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug && !disable_debug {
        Some(LevelFilter::Debug)
    } else if disable_debug {
        Some(LevelFilter::Info)
    } else {
        None
    }
}

/// Initializes `env_logger`. Calling it twice is harmless.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    builder.format(|buf, record| {
        writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
    });
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_levels() {
        assert_eq!(level_from_flags(false, false, false), None);
        assert_eq!(level_from_flags(true, true, false), Some(LevelFilter::Off));
        assert_eq!(level_from_flags(false, true, false), Some(LevelFilter::Debug));
        assert_eq!(level_from_flags(false, true, true), Some(LevelFilter::Info));
        assert_eq!(level_from_flags(false, false, true), Some(LevelFilter::Info));
    }
}
