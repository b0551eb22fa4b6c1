//! Stimulus encoders: raw characters, word tokens and brightness grids.

use crate::config::{AppConfig, EncoderConfig};
use crate::error::{EngineError, Result};
use crate::store::{NeuronSpec, NeuronStore};
use crate::topology::random_point_in;
use bionet_data::{NeuronId, NeuronKind, RegionId};
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

/// Frequent German and English function words. They land in the low-rank
/// `FUNCTION` region so content words can always be reached from them.
pub const COMMON_WORDS: &[&str] = &[
    "der", "die", "das", "den", "dem", "des", "ein", "eine", "einen", "einem", "einer", "und",
    "oder", "ist", "sind", "hat", "haben", "ich", "du", "er", "sie", "es", "wir", "ihr", "mit",
    "von", "zu", "im", "in", "an", "auf", "nicht", "kann", "the", "a", "and", "or", "is",
    "are", "has", "have", "i", "you", "he", "she", "it", "we", "they", "with", "of", "to", "on",
    "not", "can",
];

/// How a token is routed to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Punctuation,
    Common,
    /// Content word; carries its length bucket.
    Content { long: bool },
}

impl TokenClass {
    #[must_use]
    pub fn of(token: &str, cfg: &EncoderConfig) -> Self {
        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if matches!(c, '.' | ',' | '!' | '?' | ';' | ':') {
                return Self::Punctuation;
            }
        }
        let lower = token.to_lowercase();
        if COMMON_WORDS.contains(&lower.as_str()) {
            return Self::Common;
        }
        Self::Content {
            long: token.chars().count() > cfg.concept_max_len,
        }
    }

    #[must_use]
    pub fn region(self) -> &'static str {
        match self {
            Self::Punctuation => RegionId::SYNTAX,
            Self::Common => RegionId::FUNCTION,
            Self::Content { long: false } => RegionId::CONCEPT,
            Self::Content { long: true } => RegionId::ABSTRACT,
        }
    }

    #[must_use]
    pub fn threshold(self, cfg: &EncoderConfig) -> f32 {
        match self {
            Self::Punctuation => cfg.punctuation_threshold,
            _ => cfg.concept_threshold,
        }
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}_]+|[.,!?;:]").expect("static token regex"))
}

/// Splits text into word runs and standalone punctuation marks.
#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    token_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Bumps the keyboard neuron of every character. Returns how many matched.
pub fn encode_characters(store: &mut NeuronStore, text: &str, cfg: &EncoderConfig) -> usize {
    let mut hits = 0;
    for c in text.chars().flat_map(char::to_uppercase) {
        let Some(id) = store.find_by_character(c) else {
            continue;
        };
        if let Some(n) = store.get_mut(id) {
            n.potential += cfg.key_potential;
            n.stress += cfg.key_stress;
            hits += 1;
        }
    }
    hits
}

/// What a pass of the token encoder did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenReport {
    pub tokens: usize,
    pub created: Vec<NeuronId>,
    pub links_created: usize,
    pub links_reinforced: usize,
    /// Concept neurons whose stress qualifies them for region expansion.
    pub expansion_candidates: Vec<NeuronId>,
}

/// Feeds the token stream into concept neurons and wires consecutive tokens.
pub fn encode_tokens<R: Rng>(
    store: &mut NeuronStore,
    text: &str,
    config: &AppConfig,
    learning_mode: bool,
    rng: &mut R,
) -> TokenReport {
    let cfg = &config.encoder;
    let increment = if learning_mode {
        cfg.learning_increment
    } else {
        cfg.conversation_increment
    };
    let enforce_rank = learning_mode || cfg.strict_ranks;

    let mut report = TokenReport::default();
    let mut prev: Option<NeuronId> = None;

    for token in tokenize(text) {
        report.tokens += 1;
        let concept = match store.find_by_label(token) {
            Some(id) => Some(id),
            None => {
                if store.neuron_count() >= config.engine.max_neurons {
                    tracing::debug!(token, "Neuron ceiling reached, token not learned");
                    None
                } else {
                    let class = TokenClass::of(token, cfg);
                    let region = RegionId::from(class.region());
                    let (x, y) = random_point_in(store, &region, rng).unwrap_or((0.0, 0.0));
                    let id = store.create_neuron(
                        NeuronSpec::new(region, NeuronKind::Concept(token.to_string()))
                            .at(x, y)
                            .threshold(class.threshold(cfg)),
                    );
                    tracing::debug!(token, neuron = %id, "New concept");
                    report.created.push(id);
                    Some(id)
                }
            }
        };

        if let Some(id) = concept {
            if let Some(n) = store.get_mut(id) {
                n.potential += cfg.concept_potential;
                n.stress += cfg.concept_stress;
                if n.stress > config.plasticity.expansion_stress
                    && token.chars().count() > config.plasticity.expansion_min_label_len
                    && !report.expansion_candidates.contains(&id)
                {
                    report.expansion_candidates.push(id);
                }
            }
        }

        if let (Some(from), Some(to)) = (prev, concept) {
            if from != to {
                link(store, from, to, increment, enforce_rank, config, &mut report);
            }
        }
        prev = concept;
    }

    report
}

fn link(
    store: &mut NeuronStore,
    from: NeuronId,
    to: NeuronId,
    increment: f32,
    enforce_rank: bool,
    config: &AppConfig,
    report: &mut TokenReport,
) {
    let max_weight = config.physics.max_weight;
    let step = config.encoder.plasticity_step;
    if let Some(existing) = store.get_mut(from).and_then(|n| n.synapse_to_mut(to)) {
        existing.weight = (existing.weight + increment).min(max_weight);
        existing.plasticity = (existing.plasticity + step).min(1.0);
        report.links_reinforced += 1;
        return;
    }
    if store.connect(from, to, increment.min(max_weight), 0.9, enforce_rank) {
        report.links_created += 1;
    }
}

/// Injects potential into the pixel neurons of bright cells.
///
/// `grid` is row-major with one brightness byte per cell.
pub fn encode_image(store: &mut NeuronStore, grid: &[u8], cfg: &EncoderConfig) -> Result<usize> {
    let expected = cfg.retina_width * cfg.retina_height;
    if grid.len() != expected {
        return Err(EngineError::InvalidImage {
            expected,
            actual: grid.len(),
        });
    }
    let mut lit = 0;
    for (i, &brightness) in grid.iter().enumerate() {
        if brightness <= cfg.brightness_threshold {
            continue;
        }
        let Some(id) = store.find_by_pixel(i) else {
            continue;
        };
        if let Some(n) = store.get_mut(id) {
            n.potential += cfg.pixel_potential;
            lit += 1;
        }
    }
    Ok(lit)
}
