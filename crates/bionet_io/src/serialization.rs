//! JSON helpers with uniform error reporting.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};

/// Serializes data to compact JSON.
pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string. Blank input is a validation error.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bionet_data::{BrainSnapshot, Region, RegionId};

    fn snapshot() -> BrainSnapshot {
        BrainSnapshot {
            timestamp: 12,
            regions: vec![Region {
                id: RegionId::from(RegionId::CORE),
                label: "ASSOCIATION".into(),
                x: 400.0,
                y: 0.0,
                radius: 250.0,
                target_count: 50,
                rank: 2,
                default_threshold: 25.0,
                dynamic: false,
            }],
            neurons: Vec::new(),
        }
    }

    #[test]
    fn test_snapshot_json_keeps_region() {
        let json = to_json(&snapshot()).expect("serialize");
        let restored: BrainSnapshot = from_json(&json).expect("deserialize");
        assert_eq!(restored, snapshot());
    }

    #[test]
    fn test_empty_json_fails() {
        let result: Result<BrainSnapshot> = from_json("  ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_missing_fields_fail_and_pretty_parses() {
        let partial: Result<BrainSnapshot> = from_json(r#"{"timestamp": 1, "regions": []}"#);
        assert!(matches!(partial, Err(IoError::Serialization(_))));
        let pretty = to_json_pretty(&snapshot()).expect("serialize");
        assert_eq!(from_json::<BrainSnapshot>(&pretty).expect("parse"), snapshot());
    }
}
