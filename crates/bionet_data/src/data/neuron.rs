use super::region::RegionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable neuron identifier, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeuronId(pub u64);

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a neuron stands for. Decided once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NeuronKind {
    /// Keyboard neuron bound to a single (uppercase) character.
    Sensory(char),
    /// Retina neuron bound to one cell of the brightness grid.
    Pixel(usize),
    /// Word or punctuation token learned from text.
    Concept(String),
    /// Unlabelled association neuron.
    Generic,
}

impl NeuronKind {
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Concept(label) => Some(label),
            _ => None,
        }
    }

    /// Input neurons are created at boot and never pruned.
    #[must_use]
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Sensory(_) | Self::Pixel(_))
    }
}

/// Per-neuron neuromodulator levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neuromodulators {
    pub reward: f32,
    pub inhibition: f32,
    pub excitation: f32,
}

impl Default for Neuromodulators {
    fn default() -> Self {
        Self {
            reward: 0.1,
            inhibition: 0.0,
            excitation: 0.0,
        }
    }
}

impl Neuromodulators {
    /// Multiplier applied to outgoing signal strength.
    #[must_use]
    pub fn gain(&self) -> f32 {
        (1.0 + self.excitation - self.inhibition).clamp(0.0, 2.0)
    }

    pub fn decay(&mut self, factor: f32) {
        self.reward *= factor;
        self.inhibition *= factor;
        self.excitation *= factor;
    }
}

/// Directed, weighted edge owned by its source neuron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    pub target: NeuronId,
    pub weight: f32,
    pub plasticity: f32,
    #[serde(default)]
    pub last_active: Option<u64>,
}

impl Synapse {
    #[must_use]
    pub fn new(target: NeuronId, weight: f32, plasticity: f32) -> Self {
        Self {
            target,
            weight,
            plasticity,
            last_active: None,
        }
    }

    /// True when the synapse carried a signal within `window_ms` of `now`.
    #[must_use]
    pub fn active_within(&self, now: u64, window_ms: u64) -> bool {
        self.last_active
            .is_some_and(|t| now.saturating_sub(t) <= window_ms)
    }
}

/// A single simulated unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: NeuronId,
    pub region: RegionId,
    pub x: f32,
    pub y: f32,
    pub kind: NeuronKind,
    pub potential: f32,
    pub threshold: f32,
    pub refractory: u32,
    #[serde(default)]
    pub last_fired: Option<u64>,
    pub stress: f32,
    pub energy: f32,
    #[serde(default)]
    pub age: u64,
    #[serde(default)]
    pub compressed: bool,
    #[serde(default)]
    pub modulators: Neuromodulators,
    pub synapses: Vec<Synapse>,
}

impl Neuron {
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.kind.label()
    }

    #[must_use]
    pub fn fired_within(&self, now: u64, window_ms: u64) -> bool {
        self.last_fired
            .is_some_and(|t| now.saturating_sub(t) <= window_ms)
    }

    #[must_use]
    pub fn synapse_to(&self, target: NeuronId) -> Option<&Synapse> {
        self.synapses.iter().find(|s| s.target == target)
    }

    pub fn synapse_to_mut(&mut self, target: NeuronId) -> Option<&mut Synapse> {
        self.synapses.iter_mut().find(|s| s.target == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_label_only_for_concepts() {
        assert_eq!(NeuronKind::Concept("HUND".into()).label(), Some("HUND"));
        assert_eq!(NeuronKind::Sensory('A').label(), None);
        assert!(NeuronKind::Pixel(3).is_input());
        assert!(!NeuronKind::Generic.is_input());
    }

    #[test]
    fn test_gain_is_clamped() {
        let mut m = Neuromodulators {
            excitation: 5.0,
            ..Default::default()
        };
        assert_eq!(m.gain(), 2.0);
        m.excitation = 0.0;
        m.inhibition = 3.0;
        assert_eq!(m.gain(), 0.0);
    }

    #[test]
    fn test_synapse_window() {
        let mut s = Synapse::new(NeuronId(1), 1.0, 0.5);
        assert!(!s.active_within(100, 1000));
        s.last_active = Some(5_000);
        assert!(s.active_within(10_000, 5_000));
        assert!(!s.active_within(10_001, 5_000));
    }
}
