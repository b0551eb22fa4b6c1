//! Readouts for the host: population statistics and a health check.

use crate::store::NeuronStore;
use crate::teacher::{TeacherErrorCode, TeacherStatus};
use serde::Serialize;
use std::collections::HashMap;

/// What the engine is currently doing on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Awake,
    Thinking,
    Sleeping,
    Frozen,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrainStats {
    pub mode: Mode,
    pub learning_mode: bool,
    pub neurons: usize,
    pub synapses: usize,
    pub regions: usize,
    pub concepts: usize,
    pub compressed: usize,
    pub average_weight: f32,
    pub neurons_per_region: HashMap<String, usize>,
    pub ticks: u64,
    pub firings: u64,
    pub teacher: TeacherStatus,
}

impl BrainStats {
    pub(crate) fn collect(
        store: &NeuronStore,
        mode: Mode,
        learning_mode: bool,
        ticks: u64,
        firings: u64,
        teacher: TeacherStatus,
    ) -> Self {
        let synapses = store.synapse_count();
        let total_weight: f32 = store
            .neurons()
            .iter()
            .flat_map(|n| n.synapses.iter().map(|s| s.weight))
            .sum();
        let mut neurons_per_region = HashMap::new();
        for n in store.neurons() {
            *neurons_per_region.entry(n.region.to_string()).or_insert(0) += 1;
        }
        Self {
            mode,
            learning_mode,
            neurons: store.neuron_count(),
            synapses,
            regions: store.regions().len(),
            concepts: store.labels().len(),
            compressed: store.neurons().iter().filter(|n| n.compressed).count(),
            average_weight: if synapses == 0 {
                0.0
            } else {
                total_weight / synapses as f32
            },
            neurons_per_region,
            ticks,
            firings,
            teacher,
        }
    }
}

/// Structural health of the network plus the teacher's error code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Non-input neurons with no synapse in either direction.
    pub orphans: usize,
    /// Synapses below the weakness floor.
    pub weak_synapses: usize,
    pub neurons: usize,
    pub synapses: usize,
    pub error: Option<TeacherErrorCode>,
}

impl HealthReport {
    pub(crate) fn collect(
        store: &NeuronStore,
        weak_floor: f32,
        error: Option<TeacherErrorCode>,
    ) -> Self {
        Self {
            orphans: store.orphan_ids().len(),
            weak_synapses: store
                .neurons()
                .iter()
                .flat_map(|n| n.synapses.iter())
                .filter(|s| s.weight < weak_floor)
                .count(),
            neurons: store.neuron_count(),
            synapses: store.synapse_count(),
            error,
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.orphans == 0 && self.error.is_none()
    }

    /// One-line summary for logs and the console.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} neurons, {} synapses, {} orphans, {} weak synapses",
            self.neurons, self.synapses, self.orphans, self.weak_synapses
        );
        if let Some(code) = self.error {
            line.push_str(&format!(", error: {code:?}"));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NeuronSpec;
    use bionet_data::{NeuronKind, Region, RegionId};

    #[test]
    fn test_health_counts_orphans_and_weak_links() {
        let mut store = NeuronStore::new(vec![Region {
            id: RegionId::from(RegionId::CORE),
            label: "CORE".into(),
            x: 0.0,
            y: 0.0,
            radius: 100.0,
            target_count: 10,
            rank: 2,
            default_threshold: 25.0,
            dynamic: false,
        }]);
        let a = store.create_neuron(NeuronSpec::new(RegionId::CORE, NeuronKind::Generic));
        let b = store.create_neuron(NeuronSpec::new(RegionId::CORE, NeuronKind::Generic));
        store.create_neuron(NeuronSpec::new(RegionId::CORE, NeuronKind::Generic));
        store.connect(a, b, 0.2, 0.5, false);

        let report = HealthReport::collect(&store, 0.5, None);
        assert_eq!(report.orphans, 1);
        assert_eq!(report.weak_synapses, 1);
        assert!(!report.is_healthy());
        assert!(report.summary().contains("1 orphans"));

        let silent = HealthReport::collect(&store, 0.5, Some(TeacherErrorCode::StudentSilent));
        assert!(silent.summary().ends_with("error: StudentSilent"));
    }
}
