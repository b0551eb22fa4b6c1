//! Snapshot files on disk.
//!
//! Paths ending in `.gz` are gzip-compressed JSON, anything else is plain
//! pretty-printed JSON.

use crate::error::{IoError, Result};
use crate::serialization::{from_json, to_json, to_json_pretty};
use bionet_data::BrainSnapshot;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

pub fn save_snapshot<P: AsRef<Path>>(snapshot: &BrainSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let context = || format!("writing snapshot to {}", path.display());

    if is_gzip(path) {
        let json = to_json(snapshot)?;
        let file = File::create(path).map_err(|e| IoError::from(e).with_context(context()))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(json.as_bytes())
            .map_err(|e| IoError::compression(e.to_string()).with_context(context()))?;
        encoder
            .finish()
            .map_err(|e| IoError::compression(e.to_string()).with_context(context()))?;
    } else {
        let json = to_json_pretty(snapshot)?;
        std::fs::write(path, json).map_err(|e| IoError::from(e).with_context(context()))?;
    }

    tracing::info!(
        path = %path.display(),
        neurons = snapshot.neurons.len(),
        synapses = snapshot.synapse_count(),
        "Snapshot saved"
    );
    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<BrainSnapshot> {
    let path = path.as_ref();
    let context = || format!("reading snapshot from {}", path.display());

    let json = if is_gzip(path) {
        let file = File::open(path).map_err(|e| IoError::from(e).with_context(context()))?;
        let mut json = String::new();
        GzDecoder::new(file)
            .read_to_string(&mut json)
            .map_err(|e| IoError::compression(e.to_string()).with_context(context()))?;
        json
    } else {
        std::fs::read_to_string(path).map_err(|e| IoError::from(e).with_context(context()))?
    };

    let snapshot: BrainSnapshot = from_json(&json).map_err(|e| e.with_context(context()))?;
    if snapshot.regions.is_empty() {
        return Err(IoError::validation("snapshot has no regions").with_context(context()));
    }
    Ok(snapshot)
}
