use serde::{Deserialize, Serialize};
use std::fmt;

/// Region identifier (upper-case name, e.g. `INPUT`, `CONCEPT`, `HUND`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub String);

impl RegionId {
    pub const INPUT: &'static str = "INPUT";
    pub const VISUAL: &'static str = "VISUAL";
    pub const FUNCTION: &'static str = "FUNCTION";
    pub const CORE: &'static str = "CORE";
    pub const CONCEPT: &'static str = "CONCEPT";
    pub const ABSTRACT: &'static str = "ABSTRACT";
    pub const SYNTAX: &'static str = "SYNTAX";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<&str> for RegionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Named group of neurons with a layout rank.
///
/// Synapses may only run from a lower-or-equal rank to a higher-or-equal rank
/// wherever rank enforcement applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub target_count: usize,
    pub rank: u8,
    pub default_threshold: f32,
    /// Created at runtime by region expansion.
    #[serde(default)]
    pub dynamic: bool,
}
