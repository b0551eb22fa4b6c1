//! Snapshot export and validated import.
//!
//! Import never trusts stored region ids or thresholds. Both are derived again
//! from each neuron's kind so a snapshot written by an older layout still lands
//! in the right place.

use crate::config::AppConfig;
use crate::encoders::TokenClass;
use crate::error::{EngineError, Result};
use crate::store::NeuronStore;
use crate::topology::boot_regions;
use bionet_data::{BrainSnapshot, Neuron, NeuronKind, Region, RegionId};
use std::collections::HashSet;

#[must_use]
pub fn export(store: &NeuronStore, now: u64) -> BrainSnapshot {
    BrainSnapshot {
        timestamp: now,
        regions: store.regions().to_vec(),
        neurons: store.neurons().to_vec(),
    }
}

/// Parses snapshot JSON. Missing fields are reported as malformed.
pub fn parse(json: &str) -> Result<BrainSnapshot> {
    serde_json::from_str(json).map_err(|e| EngineError::malformed(e.to_string()))
}

/// Checks structural rules, then rebuilds regions and thresholds.
///
/// Returns the regions and neurons to install. On error nothing is returned,
/// so the caller's state stays untouched.
pub fn restore(snapshot: BrainSnapshot, config: &AppConfig) -> Result<(Vec<Region>, Vec<Neuron>)> {
    validate(&snapshot)?;

    let mut regions = snapshot.regions;
    for boot in boot_regions(config) {
        if !regions.iter().any(|r| r.id == boot.id) {
            regions.push(boot);
        }
    }

    let mut neurons = snapshot.neurons;
    let ids: HashSet<_> = neurons.iter().map(|n| n.id).collect();
    for n in &mut neurons {
        n.region = region_for(n, &regions, config);
        n.threshold = threshold_for(n, &regions, config);
        if !n.potential.is_finite() {
            n.potential = 0.0;
        }
        n.synapses.retain(|s| ids.contains(&s.target) && s.target != n.id);
    }
    Ok((regions, neurons))
}

fn validate(snapshot: &BrainSnapshot) -> Result<()> {
    if snapshot.regions.is_empty() {
        return Err(EngineError::invalid("snapshot has no regions"));
    }
    let mut region_ids = HashSet::new();
    for r in &snapshot.regions {
        if !region_ids.insert(&r.id) {
            return Err(EngineError::invalid(format!("duplicate region {}", r.id)));
        }
        let geometry = [r.x, r.y, r.radius, r.default_threshold];
        if geometry.iter().any(|v| !v.is_finite()) || r.radius < 0.0 {
            return Err(EngineError::invalid(format!(
                "region {} has invalid geometry (radius {})",
                r.id, r.radius
            )));
        }
    }
    let mut neuron_ids = HashSet::new();
    for n in &snapshot.neurons {
        if !neuron_ids.insert(n.id) {
            return Err(EngineError::invalid(format!("duplicate neuron {}", n.id)));
        }
        // The store hands out `max id + 1` next.
        if n.id.0 == u64::MAX {
            return Err(EngineError::invalid(format!("neuron id {} out of range", n.id)));
        }
        if !n.x.is_finite() || !n.y.is_finite() {
            return Err(EngineError::invalid(format!("neuron {} has no finite position", n.id)));
        }
        if let Some(s) = n
            .synapses
            .iter()
            .find(|s| !s.weight.is_finite() || s.weight < 0.0)
        {
            return Err(EngineError::invalid(format!(
                "synapse {} -> {} has weight {}",
                n.id, s.target, s.weight
            )));
        }
    }
    Ok(())
}

fn region_for(n: &Neuron, regions: &[Region], config: &AppConfig) -> RegionId {
    let known = |id: &RegionId| regions.iter().any(|r| &r.id == id);
    match &n.kind {
        NeuronKind::Sensory(_) => RegionId::from(RegionId::INPUT),
        NeuronKind::Pixel(_) => RegionId::from(RegionId::VISUAL),
        NeuronKind::Concept(label) => {
            let own = RegionId::new(label.to_uppercase());
            let is_dynamic = regions.iter().any(|r| r.id == own && r.dynamic);
            if is_dynamic {
                own
            } else {
                let class = TokenClass::of(label, &config.encoder);
                RegionId::from(class.region())
            }
        }
        NeuronKind::Generic if known(&n.region) => n.region.clone(),
        NeuronKind::Generic => RegionId::from(RegionId::CORE),
    }
}

fn threshold_for(n: &Neuron, regions: &[Region], config: &AppConfig) -> f32 {
    let enc = &config.encoder;
    match &n.kind {
        NeuronKind::Sensory(_) => enc.keyboard_threshold,
        NeuronKind::Pixel(_) => enc.pixel_threshold,
        NeuronKind::Concept(_) if n.compressed => config.plasticity.compressed_threshold,
        NeuronKind::Concept(label) => TokenClass::of(label, enc).threshold(enc),
        NeuronKind::Generic => regions
            .iter()
            .find(|r| r.id == n.region)
            .map_or(config.physics.base_threshold, |r| r.default_threshold),
    }
}
