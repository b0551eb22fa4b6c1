mod common;

use bionet_data::{NeuronId, ReinforcementKind};
use common::BrainBuilder;
use proptest::prelude::*;
use std::collections::HashMap;

const VOCABULARY: &[&str] = &[
    "der", "die", "Hund", "Katze", "bellt", "miaut", "Baum", "Vogel", "singt", ".", "!", "und",
];

prop_compose! {
    fn arb_sentence()(words in prop::collection::vec(prop::sample::select(VOCABULARY), 1..8)) -> String {
        words.join(" ")
    }
}

#[derive(Debug, Clone)]
enum Stimulus {
    Text(String),
    Reward,
    Punish,
    Quiet,
}

fn arb_stimulus() -> impl Strategy<Value = Stimulus> {
    prop_oneof![
        3 => arb_sentence().prop_map(Stimulus::Text),
        1 => Just(Stimulus::Reward),
        1 => Just(Stimulus::Punish),
        4 => Just(Stimulus::Quiet),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_weights_stay_non_negative(
        seed in any::<u64>(),
        learning in any::<bool>(),
        script in prop::collection::vec(arb_stimulus(), 1..60),
    ) {
        let mut builder = BrainBuilder::new().with_seed(seed);
        if learning {
            builder = builder.learning();
        }
        let mut brain = builder.build();

        for (t, stimulus) in script.into_iter().enumerate() {
            let now = t as u64 * 50;
            match stimulus {
                Stimulus::Text(text) => { brain.process_text(&text, now); }
                Stimulus::Reward => { brain.apply_reinforcement(ReinforcementKind::Reward, now); }
                Stimulus::Punish => { brain.apply_reinforcement(ReinforcementKind::Punish, now); }
                Stimulus::Quiet => {}
            }
            brain.tick(now);
            for n in brain.store().neurons() {
                for s in &n.synapses {
                    prop_assert!(s.weight >= 0.0, "{} -> {} has weight {}", n.id, s.target, s.weight);
                    prop_assert!(s.weight <= brain.config().physics.max_weight);
                }
            }
        }
    }

    #[test]
    fn prop_refractory_counts_down_by_one(
        seed in any::<u64>(),
        sentences in prop::collection::vec(arb_sentence(), 1..5),
    ) {
        let mut brain = BrainBuilder::new().with_seed(seed).build();
        for s in &sentences {
            brain.process_text(s, 0);
        }

        for t in 1..40u64 {
            let before: HashMap<NeuronId, u32> = brain
                .store()
                .neurons()
                .iter()
                .map(|n| (n.id, n.refractory))
                .collect();
            let fired = brain.tick(t * 50);
            for n in brain.store().neurons() {
                let Some(&prev) = before.get(&n.id) else { continue };
                if fired.contains(&n.id) {
                    // Only a neuron whose countdown just ran out may fire.
                    prop_assert!(prev <= 1, "{} fired with refractory {}", n.id, prev);
                } else {
                    prop_assert_eq!(n.refractory, prev.saturating_sub(1));
                }
            }
        }
    }

    #[test]
    fn prop_no_firing_inside_refractory_window(
        seed in any::<u64>(),
        sentences in prop::collection::vec(arb_sentence(), 1..5),
    ) {
        let mut brain = BrainBuilder::new().with_seed(seed).build();
        let physics = brain.config().physics.clone();
        let mut last_fired: HashMap<NeuronId, (u64, u32)> = HashMap::new();

        for t in 1..80u64 {
            if t % 10 == 1 {
                for s in &sentences {
                    brain.process_text(s, t * 50);
                }
            }
            for id in brain.tick(t * 50) {
                let window = match brain.store().get(id) {
                    Some(n) if n.compressed => physics.compressed_refractory_ticks,
                    _ => physics.refractory_ticks,
                };
                if let Some(&(prev_tick, prev_window)) = last_fired.get(&id) {
                    prop_assert!(
                        t - prev_tick >= u64::from(prev_window),
                        "{} fired at {} and again at {}",
                        id,
                        prev_tick,
                        t
                    );
                }
                last_fired.insert(id, (t, window));
            }
        }
    }

    #[test]
    fn prop_snapshot_round_trip_preserves_shape(
        seed in any::<u64>(),
        sentences in prop::collection::vec(arb_sentence(), 1..6),
    ) {
        let mut brain = BrainBuilder::new().with_seed(seed).build();
        for (i, s) in sentences.iter().enumerate() {
            brain.process_text(s, i as u64 * 50);
            brain.tick(i as u64 * 50 + 25);
        }
        let json = brain.export_json(1_000).expect("export");

        let mut restored = BrainBuilder::new().with_seed(seed.wrapping_add(1)).build();
        restored.import_json(&json, 1_000).expect("import");

        prop_assert_eq!(restored.store().neuron_count(), brain.store().neuron_count());
        prop_assert_eq!(restored.store().synapse_count(), brain.store().synapse_count());
        prop_assert_eq!(restored.store().labels(), brain.store().labels());
    }
}
