//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every constant the engine uses lives here, so a
//! variant of the network (faster decay, longer refractory windows, a more
//! patient teacher) is a config change rather than a code change.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impl)
//! 2. `config.toml` file (overrides defaults)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [engine]
//! seed = 42
//! max_neurons = 5000
//!
//! [physics]
//! decay = 0.92
//! refractory_ticks = 8
//!
//! [teacher]
//! patience = 30
//! ```

use serde::{Deserialize, Serialize};

/// Network-wide limits and boot layout.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the engine RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Hard ceiling on neuron count; growth is a no-op once reached.
    pub max_neurons: usize,
    /// Generic neurons placed into `CORE` at boot.
    pub initial_core_neurons: usize,
    /// Neighbourhood radius for random proximity wiring.
    pub connection_radius: f32,
    /// Chance that a neighbour inside the radius gets wired.
    pub connection_probability: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_neurons: 5000,
            initial_core_neurons: 20,
            connection_radius: 180.0,
            connection_probability: 0.3,
        }
    }
}

/// Per-tick electrical behaviour.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Potential multiplier applied every tick.
    pub decay: f32,
    /// Potential a neuron is reset to after firing.
    pub reset_potential: f32,
    pub refractory_ticks: u32,
    pub compressed_refractory_ticks: u32,
    pub base_threshold: f32,
    pub max_weight: f32,
    /// Weight bonus when a delivery pushes the target over threshold.
    pub hebbian_increment: f32,
    pub fire_stress: f32,
    pub fire_energy_cost: f32,
    pub energy_recovery: f32,
    pub max_energy: f32,
    pub compressed_max_energy: f32,
    pub modulator_decay: f32,
    /// Silence after the last labelled firing before an utterance is emitted.
    pub quiet_period_ms: u64,
    /// Potential given to a random concept per tick in thinking mode.
    pub thinking_boost: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            decay: 0.92,
            reset_potential: -10.0,
            refractory_ticks: 8,
            compressed_refractory_ticks: 2,
            base_threshold: 25.0,
            max_weight: 10.0,
            hebbian_increment: 0.1,
            fire_stress: 1.0,
            fire_energy_cost: 0.05,
            energy_recovery: 0.01,
            max_energy: 1.0,
            compressed_max_energy: 2.0,
            modulator_decay: 0.95,
            quiet_period_ms: 600,
            thinking_boost: 40.0,
        }
    }
}

/// Structural growth, pruning and consolidation.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PlasticityConfig {
    pub growth_stress: f32,
    pub expansion_stress: f32,
    /// Labels must be strictly longer than this to seed a region.
    pub expansion_min_label_len: usize,
    pub expansion_children: usize,
    pub expansion_base_distance: f32,
    pub expansion_distance_per_region: f32,
    pub expansion_radius: f32,
    pub expansion_target_count: usize,
    pub seed_forward_weight: f32,
    pub seed_backward_weight: f32,
    pub prune_weight_floor: f32,
    pub weak_synapse_floor: f32,
    pub sleep_duration_ms: u64,
    /// Fraction of the distance to the region anchor covered during sleep.
    pub relax_factor: f32,
    pub compression_strong_weight: f32,
    pub compression_min_links: usize,
    pub compression_min_label_len: usize,
    pub compressed_threshold: f32,
}

impl Default for PlasticityConfig {
    fn default() -> Self {
        Self {
            growth_stress: 100.0,
            expansion_stress: 500.0,
            expansion_min_label_len: 2,
            expansion_children: 6,
            expansion_base_distance: 350.0,
            expansion_distance_per_region: 80.0,
            expansion_radius: 120.0,
            expansion_target_count: 15,
            seed_forward_weight: 3.0,
            seed_backward_weight: 1.0,
            prune_weight_floor: 0.05,
            weak_synapse_floor: 0.5,
            sleep_duration_ms: 5000,
            relax_factor: 0.3,
            compression_strong_weight: 5.0,
            compression_min_links: 8,
            compression_min_label_len: 3,
            compressed_threshold: 5.0,
        }
    }
}

/// Stimulus injection strengths.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EncoderConfig {
    pub key_potential: f32,
    pub key_stress: f32,
    pub keyboard_threshold: f32,
    pub concept_potential: f32,
    pub concept_stress: f32,
    pub concept_threshold: f32,
    pub punctuation_threshold: f32,
    /// Weight added per observed transition while learning mode is on.
    pub learning_increment: f32,
    /// Weight added per observed transition in ordinary conversation.
    pub conversation_increment: f32,
    pub plasticity_step: f32,
    /// Enforce region ranks on token wiring even outside learning mode.
    pub strict_ranks: bool,
    /// Content words up to this length land in `CONCEPT`, longer ones in `ABSTRACT`.
    pub concept_max_len: usize,
    pub retina_width: usize,
    pub retina_height: usize,
    pub brightness_threshold: u8,
    pub pixel_potential: f32,
    pub pixel_threshold: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            key_potential: 80.0,
            key_stress: 5.0,
            keyboard_threshold: 10.0,
            concept_potential: 60.0,
            concept_stress: 15.0,
            concept_threshold: 20.0,
            punctuation_threshold: 35.0,
            learning_increment: 5.0,
            conversation_increment: 1.5,
            plasticity_step: 0.1,
            strict_ranks: false,
            concept_max_len: 6,
            retina_width: 10,
            retina_height: 10,
            brightness_threshold: 128,
            pixel_potential: 80.0,
            pixel_threshold: 10.0,
        }
    }
}

/// Reward/punish credit assignment.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReinforcementConfig {
    pub window_ms: u64,
    pub reward_potential: f32,
    pub reward_bonus: f32,
    pub punish_potential: f32,
    pub punish_penalty: f32,
}

impl Default for ReinforcementConfig {
    fn default() -> Self {
        Self {
            window_ms: 10_000,
            reward_potential: 30.0,
            reward_bonus: 2.0,
            punish_potential: 50.0,
            punish_penalty: 10.0,
        }
    }
}

/// Curriculum pacing and delegate behaviour.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TeacherConfig {
    /// Silence ticks tolerated before a correction.
    pub patience: u32,
    /// Chance per tick that the silence counter advances.
    pub pace_probability: f64,
    pub max_corrections: u32,
    pub correction_boost: f32,
    pub use_delegate: bool,
    pub delegate_timeout_ms: u64,
    /// Sentences kept from a delegate reply.
    pub max_generated_lessons: usize,
}

impl Default for TeacherConfig {
    fn default() -> Self {
        Self {
            patience: 30,
            pace_probability: 0.1,
            max_corrections: 3,
            correction_boost: 100.0,
            use_delegate: false,
            delegate_timeout_ms: 15_000,
            max_generated_lessons: 6,
        }
    }
}

/// Host driver cadence.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_ms: u64,
    pub prune_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            prune_interval_ms: 10_000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub physics: PhysicsConfig,
    pub plasticity: PlasticityConfig,
    pub encoder: EncoderConfig,
    pub reinforcement: ReinforcementConfig,
    pub teacher: TeacherConfig,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.engine.max_neurons > 0, "Max neurons must be positive");
        anyhow::ensure!(
            self.engine.max_neurons <= 100_000,
            "Max neurons too large (max 100000)"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.engine.connection_probability),
            "Connection probability must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.engine.connection_radius >= 0.0,
            "Connection radius must be non-negative"
        );

        anyhow::ensure!(
            self.physics.decay > 0.0 && self.physics.decay < 1.0,
            "Decay must be in (0.0, 1.0)"
        );
        anyhow::ensure!(
            self.physics.reset_potential <= 0.0,
            "Reset potential must not be positive"
        );
        anyhow::ensure!(self.physics.max_weight > 0.0, "Max weight must be positive");
        anyhow::ensure!(
            self.physics.hebbian_increment >= 0.0,
            "Hebbian increment must be non-negative"
        );
        anyhow::ensure!(
            self.physics.max_energy > 0.0,
            "Max energy must be positive"
        );

        anyhow::ensure!(
            self.plasticity.expansion_stress > self.plasticity.growth_stress,
            "Expansion stress must exceed growth stress"
        );
        anyhow::ensure!(
            self.plasticity.prune_weight_floor >= 0.0,
            "Prune weight floor must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.plasticity.relax_factor),
            "Relax factor must be in [0.0, 1.0]"
        );

        anyhow::ensure!(
            self.encoder.learning_increment > 0.0 && self.encoder.conversation_increment > 0.0,
            "Reinforcement increments must be positive"
        );
        anyhow::ensure!(
            self.encoder.retina_width > 0 && self.encoder.retina_height > 0,
            "Retina dimensions must be positive"
        );

        anyhow::ensure!(
            self.reinforcement.punish_penalty >= 0.0 && self.reinforcement.reward_bonus >= 0.0,
            "Reinforcement adjustments must be non-negative"
        );

        anyhow::ensure!(
            (0.0..=1.0).contains(&self.teacher.pace_probability),
            "Pace probability must be in [0.0, 1.0]"
        );
        anyhow::ensure!(self.teacher.patience > 0, "Patience must be positive");

        anyhow::ensure!(self.scheduler.tick_ms > 0, "Tick interval must be positive");
        anyhow::ensure!(
            self.scheduler.prune_interval_ms >= self.scheduler.tick_ms,
            "Prune interval must be at least one tick"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Hash of every section that changes simulation behaviour.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.physics).as_bytes());
        hasher.update(format!("{:?}", self.plasticity).as_bytes());
        hasher.update(format!("{:?}", self.encoder).as_bytes());
        hasher.update(format!("{:?}", self.reinforcement).as_bytes());
        hasher.update(format!("{:?}", self.teacher).as_bytes());
        hex::encode(hasher.finalize())
    }
}
