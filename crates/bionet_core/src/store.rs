//! Arena of neurons and regions.
//!
//! Neurons live in a `Vec` in creation order, which is also the iteration
//! order of the physics loop. Synapses reference targets by [`NeuronId`]; a
//! hash index maps ids to slots so resolution does not require a scan.

use bionet_data::{Neuron, NeuronId, NeuronKind, Neuromodulators, Region, RegionId, Synapse};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Starting energy of every new neuron.
pub const INITIAL_ENERGY: f32 = 1.0;

/// Everything the caller decides about a new neuron.
#[derive(Debug, Clone)]
pub struct NeuronSpec {
    pub region: RegionId,
    pub kind: NeuronKind,
    pub x: f32,
    pub y: f32,
    /// Overrides the region default threshold.
    pub threshold: Option<f32>,
}

impl NeuronSpec {
    pub fn new(region: impl Into<RegionId>, kind: NeuronKind) -> Self {
        Self {
            region: region.into(),
            kind,
            x: 0.0,
            y: 0.0,
            threshold: None,
        }
    }

    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct NeuronStore {
    neurons: Vec<Neuron>,
    regions: Vec<Region>,
    index: HashMap<NeuronId, usize>,
    next_id: u64,
}

impl NeuronStore {
    #[must_use]
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            ..Default::default()
        }
    }

    // --- neurons ---

    /// Creates a neuron with resting defaults and returns its id.
    pub fn create_neuron(&mut self, spec: NeuronSpec) -> NeuronId {
        let id = NeuronId(self.next_id);
        self.next_id += 1;

        let threshold = spec.threshold.unwrap_or_else(|| {
            self.region(&spec.region)
                .map_or(25.0, |r| r.default_threshold)
        });

        self.index.insert(id, self.neurons.len());
        self.neurons.push(Neuron {
            id,
            region: spec.region,
            x: spec.x,
            y: spec.y,
            kind: spec.kind,
            potential: 0.0,
            threshold,
            refractory: 0,
            last_fired: None,
            stress: 0.0,
            energy: INITIAL_ENERGY,
            age: 0,
            compressed: false,
            modulators: Neuromodulators::default(),
            synapses: Vec::new(),
        });
        id
    }

    #[must_use]
    pub fn get(&self, id: NeuronId) -> Option<&Neuron> {
        self.index.get(&id).map(|&i| &self.neurons[i])
    }

    pub fn get_mut(&mut self, id: NeuronId) -> Option<&mut Neuron> {
        self.index.get(&id).map(|&i| &mut self.neurons[i])
    }

    #[must_use]
    pub fn index_of(&self, id: NeuronId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    #[must_use]
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<NeuronId> {
        self.neurons
            .iter()
            .find(|n| n.label() == Some(label))
            .map(|n| n.id)
    }

    #[must_use]
    pub fn find_by_character(&self, c: char) -> Option<NeuronId> {
        self.neurons
            .iter()
            .find(|n| n.kind == NeuronKind::Sensory(c))
            .map(|n| n.id)
    }

    #[must_use]
    pub fn find_by_pixel(&self, index: usize) -> Option<NeuronId> {
        self.neurons
            .iter()
            .find(|n| n.kind == NeuronKind::Pixel(index))
            .map(|n| n.id)
    }

    /// Removes one neuron and every synapse pointing at it.
    pub fn remove_neuron(&mut self, id: NeuronId) -> Option<Neuron> {
        let slot = self.index_of(id)?;
        let removed = self.neurons.remove(slot);
        for n in &mut self.neurons {
            n.synapses.retain(|s| s.target != id);
        }
        self.rebuild_index();
        Some(removed)
    }

    /// Batch form of [`Self::remove_neuron`]; returns how many were removed.
    pub fn remove_neurons(&mut self, ids: &HashSet<NeuronId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let before = self.neurons.len();
        self.neurons.retain(|n| !ids.contains(&n.id));
        for n in &mut self.neurons {
            n.synapses.retain(|s| !ids.contains(&s.target));
        }
        self.rebuild_index();
        before - self.neurons.len()
    }

    /// Drops synapses matching `pred`; returns how many were removed.
    pub fn remove_synapses_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Synapse) -> bool,
    {
        let mut removed = 0;
        for n in &mut self.neurons {
            let before = n.synapses.len();
            n.synapses.retain(|s| !pred(s));
            removed += before - n.synapses.len();
        }
        removed
    }

    /// Ids that appear as the target of at least one synapse.
    #[must_use]
    pub fn targeted_ids(&self) -> HashSet<NeuronId> {
        self.neurons
            .iter()
            .flat_map(|n| n.synapses.iter().map(|s| s.target))
            .collect()
    }

    /// Non-input neurons with neither outgoing nor incoming synapses.
    #[must_use]
    pub fn orphan_ids(&self) -> HashSet<NeuronId> {
        let targeted = self.targeted_ids();
        self.neurons
            .iter()
            .filter(|n| !n.kind.is_input() && n.synapses.is_empty() && !targeted.contains(&n.id))
            .map(|n| n.id)
            .collect()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, n) in self.neurons.iter().enumerate() {
            self.index.insert(n.id, i);
        }
    }

    // --- synapses ---

    /// Region-rank rule: signals may only flow to an equal or higher rank.
    #[must_use]
    pub fn can_connect(&self, source: NeuronId, target: NeuronId) -> bool {
        match (self.rank_of(source), self.rank_of(target)) {
            (Some(src), Some(tgt)) => src <= tgt,
            _ => false,
        }
    }

    /// Adds a new synapse. Refuses self-loops, missing endpoints and, when
    /// `enforce_rank` is set, connections against the region order.
    pub fn connect(
        &mut self,
        source: NeuronId,
        target: NeuronId,
        weight: f32,
        plasticity: f32,
        enforce_rank: bool,
    ) -> bool {
        if source == target || self.get(target).is_none() {
            return false;
        }
        if enforce_rank && !self.can_connect(source, target) {
            return false;
        }
        match self.get_mut(source) {
            Some(n) => {
                n.synapses.push(Synapse::new(target, weight, plasticity));
                true
            }
            None => false,
        }
    }

    // --- regions ---

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[must_use]
    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| &r.id == id)
    }

    #[must_use]
    pub fn has_region(&self, id: &str) -> bool {
        self.regions.iter().any(|r| r.id == id)
    }

    /// Registers a region; duplicates are ignored.
    pub fn add_region(&mut self, region: Region) -> bool {
        if self.region(&region.id).is_some() {
            return false;
        }
        self.regions.push(region);
        true
    }

    #[must_use]
    pub fn rank_of(&self, id: NeuronId) -> Option<u8> {
        let neuron = self.get(id)?;
        self.region(&neuron.region).map(|r| r.rank)
    }

    // --- metrics ---

    #[must_use]
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    #[must_use]
    pub fn synapse_count(&self) -> usize {
        self.neurons.iter().map(|n| n.synapses.len()).sum()
    }

    #[must_use]
    pub fn labels(&self) -> BTreeSet<String> {
        self.neurons
            .iter()
            .filter_map(|n| n.label().map(str::to_string))
            .collect()
    }

    /// Swaps in a whole network, e.g. from a snapshot.
    ///
    /// Ids must leave room for a successor; snapshot validation rejects
    /// `u64::MAX`.
    pub fn replace(&mut self, regions: Vec<Region>, neurons: Vec<Neuron>) {
        self.next_id = neurons
            .iter()
            .filter_map(|n| n.id.0.checked_add(1))
            .max()
            .unwrap_or(0);
        self.regions = regions;
        self.neurons = neurons;
        self.rebuild_index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: &str, rank: u8) -> Region {
        Region {
            id: RegionId::from(id),
            label: id.to_string(),
            x: 0.0,
            y: 0.0,
            radius: 100.0,
            target_count: 10,
            rank,
            default_threshold: 20.0,
            dynamic: false,
        }
    }

    fn store() -> NeuronStore {
        NeuronStore::new(vec![region("LOW", 0), region("HIGH", 2)])
    }

    #[test]
    fn test_create_assigns_defaults() {
        let mut s = store();
        let id = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Generic));
        let n = s.get(id).expect("neuron exists");
        assert_eq!(n.potential, 0.0);
        assert_eq!(n.energy, INITIAL_ENERGY);
        assert_eq!(n.threshold, 20.0);
        assert_eq!(n.refractory, 0);
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let mut s = store();
        let a = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Generic));
        let b = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Generic));
        assert!(a < b);
        assert_eq!(s.neurons()[1].id, b);
    }

    #[test]
    fn test_replace_continues_after_highest_id() {
        let mut s = store();
        let a = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Generic));
        let mut neurons = s.neurons().to_vec();
        let mut far = neurons[0].clone();
        far.id = NeuronId(u64::MAX - 1);
        neurons.push(far);
        s.replace(vec![region("LOW", 0)], neurons);

        let next = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Generic));
        assert_eq!(next, NeuronId(u64::MAX));
        assert!(s.get(a).is_some());
        assert_eq!(s.get(next).map(|n| n.id), Some(next));
    }

    #[test]
    fn test_find_by_tags() {
        let mut s = store();
        let k = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Sensory('A')));
        let p = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Pixel(4)));
        let c = s.create_neuron(NeuronSpec::new("HIGH", NeuronKind::Concept("HUND".into())));
        assert_eq!(s.find_by_character('A'), Some(k));
        assert_eq!(s.find_by_pixel(4), Some(p));
        assert_eq!(s.find_by_label("HUND"), Some(c));
        assert_eq!(s.find_by_label("KATZE"), None);
    }

    #[test]
    fn test_remove_cascades_incoming_synapses() {
        let mut s = store();
        let a = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Generic));
        let b = s.create_neuron(NeuronSpec::new("HIGH", NeuronKind::Generic));
        let c = s.create_neuron(NeuronSpec::new("HIGH", NeuronKind::Generic));
        assert!(s.connect(a, b, 1.0, 0.5, true));
        assert!(s.connect(c, b, 1.0, 0.5, true));
        assert!(s.remove_neuron(b).is_some());
        assert_eq!(s.synapse_count(), 0);
        assert_eq!(s.get(c).map(|n| n.id), Some(c));
        assert!(s.get(b).is_none());
    }

    #[test]
    fn test_rank_rule_blocks_downward_links() {
        let mut s = store();
        let low = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Generic));
        let high = s.create_neuron(NeuronSpec::new("HIGH", NeuronKind::Generic));
        assert!(!s.connect(high, low, 1.0, 0.5, true));
        assert!(s.connect(high, low, 1.0, 0.5, false));
        assert!(!s.connect(low, low, 1.0, 0.5, false));
    }

    #[test]
    fn test_orphans_exclude_inputs_and_targets() {
        let mut s = store();
        let key = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Sensory('Q')));
        let lonely = s.create_neuron(NeuronSpec::new("HIGH", NeuronKind::Generic));
        let a = s.create_neuron(NeuronSpec::new("LOW", NeuronKind::Generic));
        let b = s.create_neuron(NeuronSpec::new("HIGH", NeuronKind::Generic));
        s.connect(a, b, 1.0, 0.5, true);
        let orphans = s.orphan_ids();
        assert!(orphans.contains(&lonely));
        assert!(!orphans.contains(&key));
        assert!(!orphans.contains(&b));
        assert_eq!(orphans.len(), 1);
    }
}
