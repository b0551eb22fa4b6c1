use super::neuron::Neuron;
use super::region::Region;
use serde::{Deserialize, Serialize};

/// Flat, serialisable image of the whole network.
///
/// Synapses travel embedded in their source neuron.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BrainSnapshot {
    pub timestamp: u64,
    pub regions: Vec<Region>,
    pub neurons: Vec<Neuron>,
}

impl BrainSnapshot {
    #[must_use]
    pub fn synapse_count(&self) -> usize {
        self.neurons.iter().map(|n| n.synapses.len()).sum()
    }
}
