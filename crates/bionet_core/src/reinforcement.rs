//! Window-based reward and punishment.
//!
//! Credit goes to every non-input neuron that fired inside the trailing window
//! and to the incoming synapses that were active inside that same window.

use crate::config::{PhysicsConfig, ReinforcementConfig};
use crate::store::NeuronStore;
use bionet_data::{NeuronId, ReinforcementKind};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReinforcementReport {
    pub neurons: usize,
    pub synapses_adjusted: usize,
    pub synapses_removed: usize,
}

pub fn apply(
    store: &mut NeuronStore,
    kind: ReinforcementKind,
    now: u64,
    cfg: &ReinforcementConfig,
    physics: &PhysicsConfig,
) -> ReinforcementReport {
    let window = cfg.window_ms;
    let recent: HashSet<NeuronId> = store
        .neurons()
        .iter()
        .filter(|n| !n.kind.is_input() && n.fired_within(now, window))
        .map(|n| n.id)
        .collect();

    let mut report = ReinforcementReport {
        neurons: recent.len(),
        ..Default::default()
    };
    if recent.is_empty() {
        return report;
    }

    for n in store.neurons_mut() {
        if recent.contains(&n.id) {
            match kind {
                ReinforcementKind::Reward => {
                    n.potential += cfg.reward_potential;
                    n.modulators.reward += 1.0;
                }
                ReinforcementKind::Punish => {
                    n.potential -= cfg.punish_potential;
                    n.modulators.inhibition += 1.0;
                }
            }
        }

        for s in &mut n.synapses {
            if !recent.contains(&s.target) || !s.active_within(now, window) {
                continue;
            }
            s.weight = match kind {
                ReinforcementKind::Reward => (s.weight + cfg.reward_bonus).min(physics.max_weight),
                ReinforcementKind::Punish => s.weight - cfg.punish_penalty,
            };
            report.synapses_adjusted += 1;
        }
    }

    if kind == ReinforcementKind::Punish {
        report.synapses_removed = store.remove_synapses_where(|s| s.weight <= 0.0);
    }

    tracing::info!(
        ?kind,
        neurons = report.neurons,
        adjusted = report.synapses_adjusted,
        removed = report.synapses_removed,
        "Reinforcement applied"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NeuronSpec;
    use bionet_data::{NeuronKind, Region, RegionId};

    fn store() -> NeuronStore {
        NeuronStore::new(vec![Region {
            id: RegionId::from(RegionId::CONCEPT),
            label: "CONCEPTS".into(),
            x: 0.0,
            y: 0.0,
            radius: 100.0,
            target_count: 10,
            rank: 2,
            default_threshold: 20.0,
            dynamic: false,
        }])
    }

    fn concept(s: &mut NeuronStore, label: &str) -> NeuronId {
        s.create_neuron(NeuronSpec::new(
            RegionId::CONCEPT,
            NeuronKind::Concept(label.to_string()),
        ))
    }

    /// `a -> b` with weight `w`; `b` fired and the synapse delivered at `at`.
    fn recent_pair(s: &mut NeuronStore, w: f32, at: u64) -> (NeuronId, NeuronId) {
        let a = concept(s, "DER");
        let b = concept(s, "HUND");
        s.connect(a, b, w, 0.5, false);
        if let Some(n) = s.get_mut(a) {
            n.synapses[0].last_active = Some(at);
        }
        if let Some(n) = s.get_mut(b) {
            n.last_fired = Some(at);
        }
        (a, b)
    }

    #[test]
    fn test_punish_prunes_weight_driven_to_zero() {
        let mut s = store();
        let (a, b) = recent_pair(&mut s, 5.0, 1_000);
        let report = apply(
            &mut s,
            ReinforcementKind::Punish,
            2_000,
            &ReinforcementConfig::default(),
            &PhysicsConfig::default(),
        );
        assert_eq!(report.neurons, 1);
        assert_eq!(report.synapses_removed, 1);
        assert!(s.get(a).and_then(|n| n.synapse_to(b)).is_none());
        let hund = s.get(b).expect("b");
        assert_eq!(hund.potential, -50.0);
        assert_eq!(hund.modulators.inhibition, 1.0);
    }

    #[test]
    fn test_reward_only_touches_synapses_inside_window() {
        let mut s = store();
        let cfg = ReinforcementConfig::default();
        let (a, b) = recent_pair(&mut s, 3.0, 10_000);
        let c = concept(&mut s, "BELLT");
        s.connect(c, b, 3.0, 0.5, false);
        if let Some(n) = s.get_mut(c) {
            n.synapses[0].last_active = Some(10_000 - cfg.window_ms - 1);
        }
        // Fired within the window, but the synapse is still old.
        let now = 10_000 + cfg.window_ms / 2;
        let report = apply(&mut s, ReinforcementKind::Reward, now, &cfg, &PhysicsConfig::default());

        assert_eq!(report.synapses_adjusted, 1);
        assert_eq!(
            s.get(a).and_then(|n| n.synapse_to(b)).map(|x| x.weight),
            Some(3.0 + cfg.reward_bonus)
        );
        assert_eq!(s.get(c).and_then(|n| n.synapse_to(b)).map(|x| x.weight), Some(3.0));
    }

    #[test]
    fn test_reward_caps_weight() {
        let mut s = store();
        let (a, b) = recent_pair(&mut s, 9.5, 0);
        apply(
            &mut s,
            ReinforcementKind::Reward,
            100,
            &ReinforcementConfig::default(),
            &PhysicsConfig::default(),
        );
        assert_eq!(s.get(a).and_then(|n| n.synapse_to(b)).map(|x| x.weight), Some(10.0));
    }

    #[test]
    fn test_nothing_fired_is_noop() {
        let mut s = store();
        let a = concept(&mut s, "A");
        let b = concept(&mut s, "B");
        s.connect(a, b, 1.0, 0.5, false);
        let report = apply(
            &mut s,
            ReinforcementKind::Punish,
            50_000,
            &ReinforcementConfig::default(),
            &PhysicsConfig::default(),
        );
        assert_eq!(report, ReinforcementReport::default());
        assert_eq!(s.synapse_count(), 1);
    }
}
