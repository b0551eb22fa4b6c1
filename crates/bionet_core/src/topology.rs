//! Boot layout: static regions, keyboard, retina and the initial core.

use crate::config::AppConfig;
use crate::store::{NeuronSpec, NeuronStore};
use bionet_data::{NeuronId, NeuronKind, Region, RegionId};
use rand::Rng;

/// Keyboard layout of the sensory grid (QWERTZ with a digit row).
pub const KEYBOARD_GRID: [&[char]; 4] = [
    &['1', '2', '3', '4', '5', '6', '7', '8', '9', '0'],
    &['Q', 'W', 'E', 'R', 'T', 'Z', 'U', 'I', 'O', 'P'],
    &['A', 'S', 'D', 'F', 'G', 'H', 'J', 'K', 'L'],
    &['Y', 'X', 'C', 'V', 'B', 'N', 'M'],
];

const KEY_GAP: f32 = 25.0;
const PIXEL_GAP: f32 = 12.0;

fn region(
    id: &str,
    label: &str,
    (x, y): (f32, f32),
    radius: f32,
    target_count: usize,
    rank: u8,
    default_threshold: f32,
) -> Region {
    Region {
        id: RegionId::from(id),
        label: label.to_string(),
        x,
        y,
        radius,
        target_count,
        rank,
        default_threshold,
        dynamic: false,
    }
}

/// Regions that exist from boot, in rank order.
#[must_use]
pub fn boot_regions(config: &AppConfig) -> Vec<Region> {
    let enc = &config.encoder;
    let base = config.physics.base_threshold;
    vec![
        region(RegionId::INPUT, "SENSORY (KEYBOARD)", (0.0, 0.0), 200.0, 40, 0, enc.keyboard_threshold),
        region(RegionId::VISUAL, "VISUAL (RETINA)", (0.0, 320.0), 120.0, 100, 0, enc.pixel_threshold),
        region(RegionId::FUNCTION, "FUNCTION WORDS", (300.0, -250.0), 150.0, 40, 1, enc.concept_threshold),
        region(RegionId::CORE, "ASSOCIATION", (400.0, 0.0), 250.0, 50, 2, base),
        region(RegionId::CONCEPT, "CONCEPTS", (650.0, -200.0), 220.0, 200, 2, enc.concept_threshold),
        region(RegionId::ABSTRACT, "ABSTRACT CONCEPTS", (850.0, 150.0), 200.0, 100, 3, enc.concept_threshold),
        region(RegionId::SYNTAX, "SYNTAX", (1000.0, -100.0), 100.0, 10, 4, enc.punctuation_threshold),
    ]
}

/// Builds the boot network: regions, keyboard, retina and a wired core.
pub fn build_network<R: Rng>(config: &AppConfig, rng: &mut R) -> NeuronStore {
    let mut store = NeuronStore::new(boot_regions(config));

    let (kx, ky) = store
        .region(&RegionId::from(RegionId::INPUT))
        .map_or((0.0, 0.0), |r| (r.x - 100.0, r.y - 80.0));
    for (row_idx, row) in KEYBOARD_GRID.iter().enumerate() {
        for (col_idx, &c) in row.iter().enumerate() {
            store.create_neuron(
                NeuronSpec::new(RegionId::INPUT, NeuronKind::Sensory(c)).at(
                    kx + col_idx as f32 * KEY_GAP + row_idx as f32 * 10.0,
                    ky + row_idx as f32 * KEY_GAP,
                ),
            );
        }
    }

    let (vx, vy) = store
        .region(&RegionId::from(RegionId::VISUAL))
        .map_or((0.0, 0.0), |r| (r.x - 60.0, r.y - 60.0));
    let width = config.encoder.retina_width;
    for i in 0..width * config.encoder.retina_height {
        store.create_neuron(NeuronSpec::new(RegionId::VISUAL, NeuronKind::Pixel(i)).at(
            vx + (i % width) as f32 * PIXEL_GAP,
            vy + (i / width) as f32 * PIXEL_GAP,
        ));
    }

    let core = RegionId::from(RegionId::CORE);
    for _ in 0..config.engine.initial_core_neurons {
        if let Some(pos) = random_point_in(&store, &core, rng) {
            store.create_neuron(NeuronSpec::new(core.clone(), NeuronKind::Generic).at(pos.0, pos.1));
        }
    }

    let ids: Vec<NeuronId> = store.neurons().iter().map(|n| n.id).collect();
    for id in ids {
        wire_neighbours(&mut store, id, config, rng);
    }

    tracing::info!(
        neurons = store.neuron_count(),
        synapses = store.synapse_count(),
        regions = store.regions().len(),
        "Network booted"
    );
    store
}

/// Uniform point inside a region's disc.
pub fn random_point_in<R: Rng>(store: &NeuronStore, region: &RegionId, rng: &mut R) -> Option<(f32, f32)> {
    let r = store.region(region)?;
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let dist = rng.gen_range(0.0..=r.radius.max(0.0) * 0.9);
    Some((r.x + angle.cos() * dist, r.y + angle.sin() * dist))
}

/// Random proximity wiring for a freshly placed neuron.
///
/// Neighbours within `connection_radius` are wired with probability
/// `connection_probability` and a random weight in `[0, 1)`. Input neurons are
/// never wired to each other and the rank rule always applies.
pub fn wire_neighbours<R: Rng>(store: &mut NeuronStore, source: NeuronId, config: &AppConfig, rng: &mut R) -> usize {
    let Some(src) = store.get(source) else {
        return 0;
    };
    let radius_sq = config.engine.connection_radius * config.engine.connection_radius;
    let src_input = src.kind.is_input();
    let (sx, sy) = (src.x, src.y);

    let candidates: Vec<NeuronId> = store
        .neurons()
        .iter()
        .filter(|n| n.id != source)
        .filter(|n| !(src_input && n.kind.is_input()))
        .filter(|n| {
            let (dx, dy) = (n.x - sx, n.y - sy);
            dx * dx + dy * dy < radius_sq
        })
        .map(|n| n.id)
        .collect();

    let mut wired = 0;
    for target in candidates {
        if rng.gen_bool(config.engine.connection_probability)
            && store.connect(source, target, rng.gen_range(0.0..1.0), 0.5, true)
        {
            wired += 1;
        }
    }
    wired
}
