//! Runtime counters and structured logging setup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tick and firing counters for the running engine.
pub struct Metrics {
    tick_count: AtomicU64,
    firing_count: AtomicU64,
    neuron_count: AtomicU64,
    synapse_count: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("ticks", &self.tick_count())
            .field("firings", &self.firing_count())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            firing_count: AtomicU64::new(0),
            neuron_count: AtomicU64::new(0),
            synapse_count: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick. Logs a summary every 1000 ticks.
    pub fn record_tick(&self, duration: Duration, fired: usize, neurons: usize, synapses: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.firing_count.fetch_add(fired as u64, Ordering::Relaxed);
        self.neuron_count.store(neurons as u64, Ordering::Relaxed);
        self.synapse_count.store(synapses as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick.is_multiple_of(1000) {
            tracing::info!(
                tick = tick,
                neurons = neurons,
                synapses = synapses,
                firings = self.firing_count(),
                duration_us = duration.as_micros() as u64,
                "Brain tick"
            );
        }
    }

    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    /// Total firings over the engine's lifetime.
    #[must_use]
    pub fn firing_count(&self) -> u64 {
        self.firing_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn neuron_count(&self) -> u64 {
        self.neuron_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn synapse_count(&self) -> u64 {
        self.synapse_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
