//! Structural plasticity: growth, region expansion, pruning, consolidation.

use crate::config::{AppConfig, PlasticityConfig};
use crate::store::{NeuronSpec, NeuronStore};
use crate::topology::wire_neighbours;
use bionet_data::{NeuronId, NeuronKind, Region, RegionId};
use rand::Rng;

/// Counts removed by a pruning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub synapses_removed: usize,
    pub neurons_removed: usize,
}

/// Concept neurons that can seed a region grow through expansion, not budding.
fn expansion_eligible(kind: &NeuronKind, cfg: &PlasticityConfig) -> bool {
    kind.label()
        .is_some_and(|l| l.chars().count() > cfg.expansion_min_label_len)
}

/// Neurogenesis for every stressed neuron. Returns the children created.
pub fn grow<R: Rng>(store: &mut NeuronStore, config: &AppConfig, rng: &mut R) -> Vec<NeuronId> {
    let cfg = &config.plasticity;
    let stressed: Vec<NeuronId> = store
        .neurons()
        .iter()
        .filter(|n| !n.kind.is_input() && !expansion_eligible(&n.kind, cfg))
        .filter(|n| n.stress > cfg.growth_stress)
        .map(|n| n.id)
        .collect();

    let mut children = Vec::new();
    for parent in stressed {
        match spawn_child(store, parent, config, rng) {
            Some(child) => {
                if let Some(p) = store.get_mut(parent) {
                    p.stress = 0.0;
                }
                children.push(child);
            }
            None => break,
        }
    }
    if !children.is_empty() {
        tracing::debug!(grown = children.len(), total = store.neuron_count(), "Neurogenesis");
    }
    children
}

/// Buds a generic neuron next to `parent` with a bidirectional seed link.
///
/// Returns `None` at the neuron ceiling or when the parent is gone.
pub fn spawn_child<R: Rng>(
    store: &mut NeuronStore,
    parent: NeuronId,
    config: &AppConfig,
    rng: &mut R,
) -> Option<NeuronId> {
    if store.neuron_count() >= config.engine.max_neurons {
        return None;
    }
    let p = store.get(parent)?;
    let region = p.region.clone();
    let x = p.x + rng.gen_range(-30.0..30.0);
    let y = p.y + rng.gen_range(-30.0..30.0);

    let child = store.create_neuron(NeuronSpec::new(region, NeuronKind::Generic).at(x, y));
    wire_neighbours(store, child, config, rng);

    let cfg = &config.plasticity;
    if store.get(parent).and_then(|n| n.synapse_to(child)).is_none() {
        store.connect(parent, child, cfg.seed_forward_weight, 1.0, false);
    }
    if store.get(child).and_then(|n| n.synapse_to(parent)).is_none() {
        store.connect(child, parent, cfg.seed_backward_weight, 0.5, false);
    }
    Some(child)
}

/// Creates a region around a heavily stressed concept and migrates it there.
///
/// No-op when the seed is missing, unlabelled, or its region already exists.
pub fn expand_region<R: Rng>(
    store: &mut NeuronStore,
    seed: NeuronId,
    config: &AppConfig,
    rng: &mut R,
) -> Option<RegionId> {
    let cfg = &config.plasticity;
    let n = store.get(seed)?;
    let label = n.label()?.to_string();
    let region_id = RegionId::new(label.to_uppercase());
    if store.region(&region_id).is_some() {
        return None;
    }

    let (rank, default_threshold) = store
        .region(&n.region)
        .map_or((2, config.encoder.concept_threshold), |r| (r.rank, r.default_threshold));
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let dist = cfg.expansion_base_distance
        + store.regions().len() as f32 * cfg.expansion_distance_per_region;
    let (x, y) = (n.x + angle.cos() * dist, n.y + angle.sin() * dist);

    store.add_region(Region {
        id: region_id.clone(),
        label: region_id.to_string(),
        x,
        y,
        radius: cfg.expansion_radius,
        target_count: cfg.expansion_target_count,
        rank,
        default_threshold,
        dynamic: true,
    });

    if let Some(n) = store.get_mut(seed) {
        n.region = region_id.clone();
        n.x = x;
        n.y = y;
        n.stress = 0.0;
    }

    let mut children = 0;
    for _ in 0..cfg.expansion_children {
        if spawn_child(store, seed, config, rng).is_none() {
            break;
        }
        children += 1;
    }

    tracing::info!(region = %region_id, children, rank, "Region expanded");
    Some(region_id)
}

/// Removes weak synapses, then non-input neurons left without any synapse.
pub fn prune(store: &mut NeuronStore, cfg: &PlasticityConfig) -> PruneReport {
    let floor = cfg.prune_weight_floor;
    let synapses_removed = store.remove_synapses_where(|s| s.weight < floor);
    let orphans = store.orphan_ids();
    let neurons_removed = store.remove_neurons(&orphans);
    PruneReport {
        synapses_removed,
        neurons_removed,
    }
}

/// Pulls every neuron a fraction of the way toward its region anchor.
pub fn relax_positions(store: &mut NeuronStore, factor: f32) {
    let anchors: Vec<Option<(f32, f32)>> = store
        .neurons()
        .iter()
        .map(|n| store.region(&n.region).map(|r| (r.x, r.y)))
        .collect();
    for (n, anchor) in store.neurons_mut().iter_mut().zip(anchors) {
        if let Some((ax, ay)) = anchor {
            n.x += (ax - n.x) * factor;
            n.y += (ay - n.y) * factor;
        }
    }
}

/// Sleep consolidation pass: prune, then tidy the layout.
pub fn consolidate(store: &mut NeuronStore, cfg: &PlasticityConfig) -> PruneReport {
    let report = prune(store, cfg);
    relax_positions(store, cfg.relax_factor);
    report
}

/// Marks heavily connected concepts as compressed symbols.
///
/// A compressed neuron fires at a low threshold and recovers faster.
pub fn compress_pathways(store: &mut NeuronStore, config: &AppConfig) -> usize {
    let cfg = &config.plasticity;
    let mut compressed = 0;
    for n in store.neurons_mut() {
        if n.compressed {
            continue;
        }
        let long_label = n
            .label()
            .is_some_and(|l| l.chars().count() > cfg.compression_min_label_len);
        if !long_label {
            continue;
        }
        let strong = n
            .synapses
            .iter()
            .filter(|s| s.weight > cfg.compression_strong_weight)
            .count();
        if strong > cfg.compression_min_links {
            n.compressed = true;
            n.energy = config.physics.compressed_max_energy;
            n.threshold = cfg.compressed_threshold;
            compressed += 1;
        }
    }
    compressed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::build_network;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (NeuronStore, AppConfig, ChaCha8Rng) {
        let mut config = AppConfig::default();
        config.engine.initial_core_neurons = 0;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let store = build_network(&config, &mut rng);
        (store, config, rng)
    }

    fn concept(store: &mut NeuronStore, label: &str) -> NeuronId {
        store.create_neuron(NeuronSpec::new(
            RegionId::CONCEPT,
            NeuronKind::Concept(label.to_string()),
        ))
    }

    #[test]
    fn test_growth_buds_child_and_resets_stress() {
        let (mut store, config, mut rng) = setup();
        let parent = store.create_neuron(NeuronSpec::new(RegionId::CORE, NeuronKind::Generic));
        if let Some(n) = store.get_mut(parent) {
            n.stress = config.plasticity.growth_stress + 1.0;
        }
        let children = grow(&mut store, &config, &mut rng);
        assert_eq!(children.len(), 1);
        let child = children[0];
        assert_eq!(store.get(parent).map(|n| n.stress), Some(0.0));
        assert_eq!(
            store.get(parent).and_then(|n| n.synapse_to(child)).map(|s| s.weight),
            Some(config.plasticity.seed_forward_weight)
        );
        assert!(store.get(child).and_then(|n| n.synapse_to(parent)).is_some());
        assert_eq!(store.get(child).map(|n| n.region.clone()), Some(RegionId::from(RegionId::CORE)));
    }

    #[test]
    fn test_growth_is_noop_at_ceiling() {
        let (mut store, mut config, mut rng) = setup();
        let parent = store.create_neuron(NeuronSpec::new(RegionId::CORE, NeuronKind::Generic));
        if let Some(n) = store.get_mut(parent) {
            n.stress = 1_000.0;
        }
        config.engine.max_neurons = store.neuron_count();
        assert!(grow(&mut store, &config, &mut rng).is_empty());
        assert_eq!(store.neuron_count(), config.engine.max_neurons);
    }

    #[test]
    fn test_expansion_migrates_seed() {
        let (mut store, config, mut rng) = setup();
        let seed = concept(&mut store, "Katze");
        let regions_before = store.regions().len();
        let region = expand_region(&mut store, seed, &config, &mut rng).expect("new region");
        assert_eq!(region, RegionId::from("KATZE"));
        assert_eq!(store.regions().len(), regions_before + 1);

        let n = store.get(seed).expect("seed");
        assert_eq!(n.region, region);
        assert_eq!(n.stress, 0.0);
        let children = store.neurons().iter().filter(|c| c.region == region).count();
        assert_eq!(children, 1 + config.plasticity.expansion_children);

        let r = store.region(&region).expect("region");
        assert!(r.dynamic);
        assert_eq!(r.rank, 2);
        assert!(expand_region(&mut store, seed, &config, &mut rng).is_none());
    }

    #[test]
    fn test_prune_is_idempotent() {
        let (mut store, config, _) = setup();
        let a = concept(&mut store, "A1");
        let b = concept(&mut store, "B1");
        let c = concept(&mut store, "C1");
        store.connect(a, b, 0.01, 0.5, false);
        store.connect(b, c, 3.0, 0.5, false);

        let first = prune(&mut store, &config.plasticity);
        assert_eq!(first.synapses_removed, 1);
        assert_eq!(first.neurons_removed, 1);
        assert!(store.get(a).is_none());

        let second = prune(&mut store, &config.plasticity);
        assert_eq!(second, PruneReport::default());
    }

    #[test]
    fn test_relax_moves_toward_anchor() {
        let (mut store, _, _) = setup();
        let id = store.create_neuron(
            NeuronSpec::new(RegionId::CORE, NeuronKind::Generic).at(500.0, 100.0),
        );
        relax_positions(&mut store, 0.5);
        let n = store.get(id).expect("neuron");
        assert_eq!((n.x, n.y), (450.0, 50.0));
    }

    #[test]
    fn test_compression_needs_many_strong_links() {
        let (mut store, config, _) = setup();
        let hub = concept(&mut store, "Sonne");
        for i in 0..=config.plasticity.compression_min_links {
            let t = concept(&mut store, &format!("T{i}"));
            store.connect(hub, t, 6.0, 0.5, false);
        }
        assert_eq!(compress_pathways(&mut store, &config), 1);
        let n = store.get(hub).expect("hub");
        assert!(n.compressed);
        assert_eq!(n.threshold, config.plasticity.compressed_threshold);
        assert_eq!(compress_pathways(&mut store, &config), 0);
    }
}
