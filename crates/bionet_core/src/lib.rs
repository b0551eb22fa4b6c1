//! # Bionet Core
//!
//! The simulation engine for Bionet - a self-organising spiking network that
//! learns words from text and grows its own regions.
//!
//! This crate contains the deterministic simulation logic, including:
//! - An arena of neurons with an id index and region ranks
//! - The per-tick physics loop (decay, firing, propagation, Hebbian nudge)
//! - Structural plasticity (neurogenesis, region expansion, pruning, sleep)
//! - Character, token and retina encoders
//! - Window-based reward/punishment
//! - A curriculum teacher driving the network through a state machine
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! The host owns a [`Brain`] and advances it explicitly with
//! [`Brain::tick`] and [`Brain::maintenance`]. Every random decision draws from
//! a seeded ChaCha RNG, so a fixed seed reproduces a run.
//!
//! ## Example
//!
//! ```
//! use bionet_core::{AppConfig, Brain};
//!
//! let mut config = AppConfig::default();
//! config.engine.seed = Some(42);
//! let mut brain = Brain::new(config);
//!
//! brain.process_text("DER HUND", 0);
//! let fired = brain.tick(50);
//! assert!(!fired.is_empty());
//! ```

/// Configuration management for simulation parameters
pub mod config;
/// Stimulus encoders (keyboard, tokens, retina)
pub mod encoders;
/// The host-facing engine facade
pub mod engine;
/// Error types for snapshot import and stimulus validation
pub mod error;
/// Performance metrics collection and logging
pub mod metrics;
/// One tick of electrical activity and the output buffer
pub mod physics;
/// Neurogenesis, region expansion, pruning and consolidation
pub mod plasticity;
/// Reward and punishment credit assignment
pub mod reinforcement;
/// Snapshot export and validated import
pub mod snapshot;
/// Statistics and health readouts
pub mod stats;
/// Neuron and region arena
pub mod store;
/// Curriculum state machine
pub mod teacher;
/// Boot layout and proximity wiring
pub mod topology;

pub use config::AppConfig;
pub use engine::Brain;
pub use error::{EngineError, Result};
pub use metrics::{init_logging, Metrics};
pub use stats::{BrainStats, HealthReport, Mode};
pub use teacher::{Instruction, TeacherErrorCode, TeacherState, TeacherStatus};
