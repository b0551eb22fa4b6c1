use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reward or punishment applied to the recently active sub-circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReinforcementKind {
    Reward,
    Punish,
}

/// Messages the engine queues for the host, drained once per frame.
///
/// Serialised with `#[serde(tag = "event")]` for streaming JSONL output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event")]
pub enum Notification {
    /// Region expansion produced a new region.
    RegionCreated { region: String, timestamp: u64 },
    /// The teacher accepted an instruction and built a curriculum.
    TrainingStarted {
        topic: String,
        lessons: usize,
        timestamp: u64,
    },
    /// One lesson sentence was injected in learning mode.
    LessonInjected {
        sentence: String,
        awaited: String,
        timestamp: u64,
    },
    /// Curriculum queue drained.
    TrainingCompleted { topic: String, timestamp: u64 },
    /// The student stayed silent and the awaited word was re-injected or boosted.
    CorrectionApplied {
        word: String,
        attempt: u32,
        timestamp: u64,
    },
    /// The teacher gave up on a word after repeated corrections.
    LessonSkipped { word: String, timestamp: u64 },
    /// Reward or punish signal applied.
    Reinforcement {
        kind: ReinforcementKind,
        neurons: usize,
        synapses_adjusted: usize,
        synapses_removed: usize,
        timestamp: u64,
    },
    /// A sentence assembled from firing concept neurons.
    Utterance { text: String, timestamp: u64 },
    /// Consolidation finished its pruning pass; firing is suppressed until `until`.
    SleepStarted {
        synapses_removed: usize,
        neurons_removed: usize,
        until: u64,
    },
    SleepFinished { timestamp: u64 },
    SnapshotLoaded {
        neurons: usize,
        synapses: usize,
        timestamp: u64,
    },
    /// Free-text diagnostic (delegate fallback, rejected input, ...).
    Diagnostic { message: String, timestamp: u64 },
}

impl Notification {
    /// Human readable line for chat-style hosts.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::RegionCreated { region, .. } => format!("NEW REGION FORMED: {region}"),
            Self::TrainingStarted { topic, lessons, .. } => {
                format!("Teaching '{topic}' ({lessons} lessons)")
            }
            Self::LessonInjected { sentence, .. } => format!("Teacher: {sentence}"),
            Self::TrainingCompleted { topic, .. } => format!("Lesson '{topic}' complete"),
            Self::CorrectionApplied { word, attempt, .. } => {
                format!("Correction #{attempt}: repeating '{word}'")
            }
            Self::LessonSkipped { word, .. } => format!("Giving up on '{word}' for now"),
            Self::Reinforcement {
                kind,
                neurons,
                synapses_adjusted,
                synapses_removed,
                ..
            } => format!(
                "{kind:?}: {neurons} neurons, {synapses_adjusted} synapses adjusted, {synapses_removed} removed"
            ),
            Self::Utterance { text, .. } => text.clone(),
            Self::SleepStarted {
                synapses_removed,
                neurons_removed,
                ..
            } => format!(
                "Sleeping: pruned {synapses_removed} synapses and {neurons_removed} neurons"
            ),
            Self::SleepFinished { .. } => "Awake".to_string(),
            Self::SnapshotLoaded {
                neurons, synapses, ..
            } => format!("Brain restored: {neurons} neurons, {synapses} synapses"),
            Self::Diagnostic { message, .. } => message.clone(),
        }
    }
}

/// Curriculum generation request handed to an external text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateRequest {
    pub id: Uuid,
    pub topic: String,
    pub prompt: String,
    pub issued_at: u64,
}

/// Completion of a [`DelegateRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateReply {
    pub id: Uuid,
    pub result: Result<String, String>,
}
