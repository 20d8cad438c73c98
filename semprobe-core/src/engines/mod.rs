// semprobe-core/src/engines/mod.rs
//! This module contains the clustering engine implementations.
//!
//! Each engine is a separate file within this directory and implements the
//! `ClusteringEngine` trait. To add a new engine, create a new file (e.g.,
//! `jaccard_engine.rs`), define its logic, and declare it here using
//! `pub mod <engine_name>;`.
//!
//! # License
//! MIT OR Apache-2.0

pub mod lexical_engine;
pub mod semantic_engine;
pub mod exact_engine;
