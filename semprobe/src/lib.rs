// semprobe/src/lib.rs
//! # Semprobe CLI Application
//!
//! The command-line front end for `semprobe-core`: running sampling
//! experiments, scoring collected responses offline, previewing prompts
//! and printing the effective configuration.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

#[cfg(any(test, feature = "test-exposed"))]
pub mod test_exposed {
    pub mod config {
        pub use semprobe_core::config::*;
    }
    pub mod report {
        pub use semprobe_core::report::*;
    }
}
