//! One discrete tick of electrical activity.
//!
//! Order of a tick, neurons visited in creation order:
//!
//! 1. bookkeeping: decay potential, count down refractory, decay
//!    neuromodulators, recover energy;
//! 2. the firing set is fixed from that state;
//! 3. firing neurons reset (hyperpolarise, refractory, stress, energy cost);
//! 4. every outgoing synapse of a firing neuron delivers into a per-target
//!    accumulator and is stamped active;
//! 5. accumulators are applied, then each delivering synapse whose target now
//!    sits above threshold receives the Hebbian nudge.
//!
//! Since the firing set is decided before any delivery and the nudge is checked
//! after all deliveries, the outcome does not depend on iteration order and a
//! delivery can only influence the next tick's firing decision.

use crate::config::PhysicsConfig;
use crate::store::NeuronStore;
use bionet_data::NeuronId;
use std::collections::HashMap;

/// Advances electrical state by one tick and returns the ids that fired.
///
/// With `propagate == false` (sleep) only step 1 runs.
pub fn step(store: &mut NeuronStore, cfg: &PhysicsConfig, now: u64, propagate: bool) -> Vec<NeuronId> {
    for n in store.neurons_mut() {
        if !n.potential.is_finite() {
            tracing::warn!(neuron = %n.id, "Non-finite potential reset");
            n.potential = 0.0;
        }
        n.potential *= cfg.decay;
        n.refractory = n.refractory.saturating_sub(1);
        n.modulators.decay(cfg.modulator_decay);
        let cap = if n.compressed {
            cfg.compressed_max_energy
        } else {
            cfg.max_energy
        };
        n.energy = (n.energy + cfg.energy_recovery).min(cap);
        n.age += 1;
    }

    if !propagate {
        return Vec::new();
    }

    let firing: Vec<usize> = store
        .neurons()
        .iter()
        .enumerate()
        .filter(|(_, n)| n.potential > n.threshold && n.refractory == 0)
        .map(|(i, _)| i)
        .collect();

    if firing.is_empty() {
        return Vec::new();
    }

    // Resolve deliveries before mutating anything: (source slot, synapse, target slot, amount).
    let mut deliveries: Vec<(usize, usize, usize, f32)> = Vec::new();
    for &i in &firing {
        let source = &store.neurons()[i];
        let gain = source.modulators.gain();
        for (k, syn) in source.synapses.iter().enumerate() {
            // Stale targets are skipped.
            if let Some(t) = store.index_of(syn.target) {
                deliveries.push((i, k, t, syn.weight * gain));
            }
        }
    }

    let neurons = store.neurons_mut();
    let mut fired = Vec::with_capacity(firing.len());
    for &i in &firing {
        let n = &mut neurons[i];
        n.last_fired = Some(now);
        n.potential = cfg.reset_potential;
        n.refractory = if n.compressed {
            cfg.compressed_refractory_ticks
        } else {
            cfg.refractory_ticks
        };
        n.stress += cfg.fire_stress;
        n.energy = (n.energy - cfg.fire_energy_cost).max(0.0);
        fired.push(n.id);
    }

    let mut inbox: HashMap<usize, f32> = HashMap::new();
    for &(i, k, t, amount) in &deliveries {
        neurons[i].synapses[k].last_active = Some(now);
        *inbox.entry(t).or_insert(0.0) += amount;
    }
    for (&t, &amount) in &inbox {
        neurons[t].potential += amount;
    }

    for &(i, k, t, _) in &deliveries {
        if neurons[t].potential > neurons[t].threshold {
            let syn = &mut neurons[i].synapses[k];
            syn.weight = (syn.weight + cfg.hebbian_increment).min(cfg.max_weight);
        }
    }

    fired
}

/// Labels collected from firing concept neurons, waiting for a quiet period.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    words: Vec<String>,
    last_append: Option<u64>,
}

impl OutputBuffer {
    pub fn push(&mut self, label: &str, now: u64) {
        self.words.push(label.to_string());
        self.last_append = Some(now);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.last_append = None;
    }

    /// Emits the buffered sentence once `quiet_ms` passed without an append.
    ///
    /// The buffer is cleared on flush even when the composed text is too short
    /// to be worth emitting.
    pub fn flush_if_quiet(&mut self, now: u64, quiet_ms: u64) -> Option<String> {
        let last = self.last_append?;
        if self.words.is_empty() || now.saturating_sub(last) <= quiet_ms {
            return None;
        }
        let sentence = compose_utterance(&self.words);
        self.clear();
        (sentence.chars().count() > 1).then_some(sentence)
    }
}

fn is_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | '!' | '?' | ':' | ';')
}

/// Collapses consecutive repeats, joins with spaces and normalises spacing
/// around punctuation: `"Hallo , wie geht es dir ?"` becomes
/// `"Hallo, wie geht es dir?"`.
#[must_use]
pub fn compose_utterance(words: &[String]) -> String {
    let mut unique: Vec<&str> = Vec::with_capacity(words.len());
    for w in words {
        if unique.last() != Some(&w.as_str()) {
            unique.push(w);
        }
    }
    let joined = unique.join(" ");

    let mut out = String::with_capacity(joined.len());
    let chars: Vec<char> = joined.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && is_punctuation(chars[j]) {
                i = j;
                continue;
            }
            out.push(c);
            i += 1;
            continue;
        }
        out.push(c);
        if is_punctuation(c) && chars.get(i + 1).is_some_and(|n| n.is_alphabetic()) {
            out.push(' ');
        }
        i += 1;
    }
    out
}
