//! # Bionet
//!
//! Console host for the bionet engine. The engine itself lives in
//! `bionet_core`; this crate loads configuration, parses console commands
//! and runs the session that connects the engine to an optional text
//! generator and to snapshot files.

pub mod app;

pub use bionet_core::{AppConfig, Brain};
