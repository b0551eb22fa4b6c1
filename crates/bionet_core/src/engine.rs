//! The host-facing engine.
//!
//! [`Brain`] owns the network and the teacher and is advanced explicitly: the
//! host calls [`Brain::tick`] at a fixed rate and [`Brain::maintenance`]
//! whenever [`Brain::maintenance_due`] says so. There are no background timers
//! and no interior mutability; a single caller drives everything.

use crate::config::AppConfig;
use crate::encoders::{self, TokenReport};
use crate::error::Result;
use crate::metrics::Metrics;
use crate::physics::{self, OutputBuffer};
use crate::plasticity::{self, PruneReport};
use crate::reinforcement::{self, ReinforcementReport};
use crate::snapshot;
use crate::stats::{BrainStats, HealthReport, Mode};
use crate::store::NeuronStore;
use crate::teacher::{Instruction, Student, Teacher, TeacherStatus};
use crate::topology::build_network;
use bionet_data::{
    BrainSnapshot, DelegateReply, DelegateRequest, NeuronId, NeuronKind, Notification,
    ReinforcementKind,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::time::Instant;

/// Network state plus everything a lesson can touch.
#[derive(Debug)]
struct Network {
    config: AppConfig,
    store: NeuronStore,
    rng: ChaCha8Rng,
    metrics: Metrics,
    output: OutputBuffer,
    unheard: Option<String>,
    last_utterance: Option<String>,
    notifications: VecDeque<Notification>,
    learning_mode: bool,
}

impl Network {
    fn ingest(&mut self, text: &str, now: u64, learning_mode: bool) -> TokenReport {
        encoders::encode_characters(&mut self.store, text, &self.config.encoder);
        let report =
            encoders::encode_tokens(&mut self.store, text, &self.config, learning_mode, &mut self.rng);

        for &seed in &report.expansion_candidates {
            if let Some(region) =
                plasticity::expand_region(&mut self.store, seed, &self.config, &mut self.rng)
            {
                self.metrics.increment_counter("regions_created");
                self.notifications.push_back(Notification::RegionCreated {
                    region: region.to_string(),
                    timestamp: now,
                });
            }
        }

        let compressed = plasticity::compress_pathways(&mut self.store, &self.config);
        if compressed > 0 {
            tracing::debug!(compressed, "Pathways compressed");
        }
        report
    }

    fn reinforce(&mut self, kind: ReinforcementKind, now: u64) -> ReinforcementReport {
        let report = reinforcement::apply(
            &mut self.store,
            kind,
            now,
            &self.config.reinforcement,
            &self.config.physics,
        );
        self.notifications.push_back(Notification::Reinforcement {
            kind,
            neurons: report.neurons,
            synapses_adjusted: report.synapses_adjusted,
            synapses_removed: report.synapses_removed,
            timestamp: now,
        });
        report
    }

    fn boost_random_concept(&mut self, amount: f32) {
        let concepts: Vec<NeuronId> = self
            .store
            .neurons()
            .iter()
            .filter(|n| matches!(n.kind, NeuronKind::Concept(_)))
            .map(|n| n.id)
            .collect();
        if concepts.is_empty() {
            return;
        }
        let pick = concepts[self.rng.gen_range(0..concepts.len())];
        if let Some(n) = self.store.get_mut(pick) {
            n.potential += amount;
        }
    }

    fn collect_output(&mut self, fired: &[NeuronId], now: u64) {
        for &id in fired {
            if let Some(label) = self.store.get(id).and_then(|n| n.label()) {
                self.output.push(label, now);
            }
        }
        if let Some(text) = self
            .output
            .flush_if_quiet(now, self.config.physics.quiet_period_ms)
        {
            tracing::info!(utterance = %text, "Brain spoke");
            self.unheard = Some(text.clone());
            self.last_utterance = Some(text.clone());
            self.notifications.push_back(Notification::Utterance {
                text,
                timestamp: now,
            });
        }
    }
}

impl Student for Network {
    fn inject_lesson(&mut self, sentence: &str, now: u64) {
        self.ingest(sentence, now, true);
    }

    fn knows(&self, word: &str) -> bool {
        self.store.find_by_label(word).is_some()
    }

    fn boost_concept(&mut self, word: &str, amount: f32) {
        if let Some(n) = self
            .store
            .find_by_label(word)
            .and_then(|id| self.store.get_mut(id))
        {
            n.potential += amount;
        }
    }

    fn reward(&mut self, now: u64) {
        self.reinforce(ReinforcementKind::Reward, now);
    }

    fn punish(&mut self, now: u64) {
        self.reinforce(ReinforcementKind::Punish, now);
    }

    fn take_utterance(&mut self) -> Option<String> {
        self.unheard.take()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }
}

/// The simulation engine.
#[derive(Debug)]
pub struct Brain {
    network: Network,
    teacher: Teacher,
    delegate_enabled: bool,
    frozen: bool,
    thinking: bool,
    sleep_until: Option<u64>,
    last_maintenance: Option<u64>,
}

impl Brain {
    /// Boots the static regions, input neurons and the initial core.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let seed = config.engine.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let store = build_network(&config, &mut rng);
        let teacher = Teacher::new(config.teacher.clone(), seed.wrapping_add(1));
        tracing::info!(seed, fingerprint = %config.fingerprint(), "Brain created");

        Self {
            delegate_enabled: config.teacher.use_delegate,
            network: Network {
                config,
                store,
                rng,
                metrics: Metrics::new(),
                output: OutputBuffer::default(),
                unheard: None,
                last_utterance: None,
                notifications: VecDeque::new(),
                learning_mode: false,
            },
            teacher,
            frozen: false,
            thinking: false,
            sleep_until: None,
            last_maintenance: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.network.config
    }

    #[must_use]
    pub fn store(&self) -> &NeuronStore {
        &self.network.store
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.network.metrics
    }

    // --- stimulus ---

    /// Feeds text through the character and token encoders. Ignored while
    /// frozen.
    pub fn process_text(&mut self, text: &str, now: u64) -> TokenReport {
        if self.frozen {
            return TokenReport::default();
        }
        let learning = self.network.learning_mode;
        self.network.ingest(text, now, learning)
    }

    /// Lights the retina from a row-major brightness grid.
    pub fn process_image(&mut self, grid: &[u8]) -> Result<usize> {
        if self.frozen {
            return Ok(0);
        }
        encoders::encode_image(&mut self.network.store, grid, &self.network.config.encoder)
    }

    pub fn apply_reinforcement(&mut self, kind: ReinforcementKind, now: u64) -> ReinforcementReport {
        self.network.reinforce(kind, now)
    }

    // --- teacher ---

    pub fn start_curriculum(&mut self, instruction: &str, now: u64) -> Instruction {
        self.teacher
            .instruct(instruction, self.delegate_enabled, now, &mut self.network)
    }

    pub fn stop_curriculum(&mut self) {
        self.teacher.stop();
    }

    /// Routes curricula through the external generator when enabled.
    pub fn set_delegate_enabled(&mut self, enabled: bool) {
        self.delegate_enabled = enabled;
    }

    /// Generator requests issued since the last call.
    pub fn take_delegate_requests(&mut self) -> Vec<DelegateRequest> {
        self.teacher.take_requests()
    }

    /// Hands a generator reply back to the teacher. Stale replies are ignored.
    pub fn deliver_delegate_reply(&mut self, reply: DelegateReply, now: u64) -> bool {
        self.teacher.deliver(reply, now, &mut self.network)
    }

    #[must_use]
    pub fn teacher_status(&self) -> TeacherStatus {
        self.teacher.status()
    }

    // --- modes ---

    pub fn toggle_learning_mode(&mut self) -> bool {
        self.network.learning_mode = !self.network.learning_mode;
        self.network.learning_mode
    }

    pub fn set_learning_mode(&mut self, on: bool) {
        self.network.learning_mode = on;
    }

    #[must_use]
    pub fn learning_mode(&self) -> bool {
        self.network.learning_mode
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn toggle_freeze(&mut self) -> bool {
        self.frozen = !self.frozen;
        self.frozen
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Spontaneous activity: a random concept is excited every tick and
    /// whatever fires is not spoken. Thinking unfreezes the network.
    pub fn start_thinking(&mut self) {
        self.frozen = false;
        self.thinking = true;
        self.network.output.clear();
    }

    pub fn stop_thinking(&mut self) {
        self.thinking = false;
    }

    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        self.sleep_until.is_some()
    }

    /// Consolidates and suppresses firing for the configured sleep duration.
    pub fn sleep(&mut self, now: u64) -> PruneReport {
        let report = plasticity::consolidate(&mut self.network.store, &self.network.config.plasticity);
        let until = now + self.network.config.plasticity.sleep_duration_ms;
        self.sleep_until = Some(until);
        self.network.output.clear();
        self.network.notifications.push_back(Notification::SleepStarted {
            synapses_removed: report.synapses_removed,
            neurons_removed: report.neurons_removed,
            until,
        });
        tracing::info!(
            synapses_removed = report.synapses_removed,
            neurons_removed = report.neurons_removed,
            until,
            "Sleep started"
        );
        report
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.frozen {
            Mode::Frozen
        } else if self.sleep_until.is_some() {
            Mode::Sleeping
        } else if self.thinking {
            Mode::Thinking
        } else {
            Mode::Awake
        }
    }

    // --- scheduling ---

    /// Advances the simulation by one tick and returns the neurons that fired.
    pub fn tick(&mut self, now: u64) -> Vec<NeuronId> {
        if self.frozen {
            return Vec::new();
        }
        let started = Instant::now();

        if self.sleep_until.is_some_and(|until| now >= until) {
            self.sleep_until = None;
            self.network
                .notifications
                .push_back(Notification::SleepFinished { timestamp: now });
            tracing::info!("Sleep finished");
        }
        let awake = self.sleep_until.is_none();

        if awake && self.thinking {
            let boost = self.network.config.physics.thinking_boost;
            self.network.boost_random_concept(boost);
        }

        let fired = physics::step(
            &mut self.network.store,
            &self.network.config.physics,
            now,
            awake,
        );

        if awake {
            if !self.thinking {
                self.network.collect_output(&fired, now);
            }
            plasticity::grow(&mut self.network.store, &self.network.config, &mut self.network.rng);
        }

        self.teacher.tick(now, &mut self.network);

        self.network.metrics.record_tick(
            started.elapsed(),
            fired.len(),
            self.network.store.neuron_count(),
            self.network.store.synapse_count(),
        );
        fired
    }

    /// Whether the prune interval has elapsed since the last maintenance pass.
    #[must_use]
    pub fn maintenance_due(&self, now: u64) -> bool {
        self.last_maintenance.map_or(true, |last| {
            now.saturating_sub(last) >= self.network.config.scheduler.prune_interval_ms
        })
    }

    /// Periodic pruning of weak synapses and orphaned neurons.
    pub fn maintenance(&mut self, now: u64) -> PruneReport {
        if self.frozen {
            return PruneReport::default();
        }
        self.last_maintenance = Some(now);
        let report = plasticity::prune(&mut self.network.store, &self.network.config.plasticity);
        if report != PruneReport::default() {
            tracing::debug!(
                synapses = report.synapses_removed,
                neurons = report.neurons_removed,
                "Pruned"
            );
        }
        report
    }

    // --- snapshots ---

    #[must_use]
    pub fn export_snapshot(&self, now: u64) -> BrainSnapshot {
        snapshot::export(&self.network.store, now)
    }

    pub fn export_json(&self, now: u64) -> Result<String> {
        serde_json::to_string(&self.export_snapshot(now))
            .map_err(|e| crate::error::EngineError::malformed(e.to_string()))
    }

    /// Replaces the network with a snapshot. On error the engine is untouched.
    pub fn import_snapshot(&mut self, snapshot: BrainSnapshot, now: u64) -> Result<()> {
        let (regions, neurons) = match snapshot::restore(snapshot, &self.network.config) {
            Ok(restored) => restored,
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot rejected");
                return Err(e);
            }
        };
        self.network.store.replace(regions, neurons);
        self.network.output.clear();
        self.network.unheard = None;

        let neurons = self.network.store.neuron_count();
        let synapses = self.network.store.synapse_count();
        self.network.metrics.increment_counter("snapshots_loaded");
        self.network.notifications.push_back(Notification::SnapshotLoaded {
            neurons,
            synapses,
            timestamp: now,
        });
        tracing::info!(neurons, synapses, "Snapshot loaded");
        Ok(())
    }

    pub fn import_json(&mut self, json: &str, now: u64) -> Result<()> {
        let parsed = snapshot::parse(json).inspect_err(|e| {
            tracing::warn!(error = %e, "Snapshot rejected");
        })?;
        self.import_snapshot(parsed, now)
    }

    // --- readouts ---

    /// Drains queued notifications in the order they were raised.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.network.notifications.drain(..).collect()
    }

    #[must_use]
    pub fn last_utterance(&self) -> Option<&str> {
        self.network.last_utterance.as_deref()
    }

    #[must_use]
    pub fn stats(&self) -> BrainStats {
        BrainStats::collect(
            &self.network.store,
            self.mode(),
            self.network.learning_mode,
            self.network.metrics.tick_count(),
            self.network.metrics.firing_count(),
            self.teacher.status(),
        )
    }

    #[must_use]
    pub fn health(&self) -> HealthReport {
        HealthReport::collect(
            &self.network.store,
            self.network.config.plasticity.weak_synapse_floor,
            self.teacher.error_code(),
        )
    }
}
