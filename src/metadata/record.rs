//! Remote dataset wire types
//!
//! Only the fields needed for version comparison and matching are modeled;
//! everything else rides along as an opaque payload and round-trips through
//! serialization unchanged.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The remote "latest" version marker document
///
/// `updatedAt` is an opaque token compared only for equality; its shape is
/// whatever the dataset publishes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LatestMarker {
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single metadata record from the snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    /// Content hashes this record claims (uppercase SHA-256 hex)
    #[serde(default)]
    pub hashes: HashSet<String>,

    /// File names this record claims
    #[serde(default)]
    pub files: HashSet<String>,

    /// Everything else (creator, description, workflows, ...)
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// The full dataset as served to the matcher
#[derive(Debug, Clone, Default)]
pub struct MetadataSnapshot {
    pub updated_at: Option<serde_json::Value>,
    pub records: Vec<MetadataRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marker_token_equality() {
        let a: LatestMarker = serde_json::from_value(json!({"updatedAt": "2024-05-01"})).unwrap();
        let b: LatestMarker = serde_json::from_value(json!({"updatedAt": "2024-05-01"})).unwrap();
        let c: LatestMarker = serde_json::from_value(json!({"updatedAt": "2024-06-01"})).unwrap();

        assert_eq!(a.updated_at, b.updated_at);
        assert_ne!(a.updated_at, c.updated_at);
    }

    #[test]
    fn test_marker_preserves_unknown_fields() {
        let raw = json!({"updatedAt": 1714521600, "source": "civitai"});
        let marker: LatestMarker = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(marker.updated_at, Some(json!(1714521600)));
        assert_eq!(serde_json::to_value(&marker).unwrap(), raw);
    }

    #[test]
    fn test_marker_without_token() {
        let marker: LatestMarker = serde_json::from_value(json!({})).unwrap();
        assert!(marker.updated_at.is_none());
    }

    #[test]
    fn test_record_parses_hashes_files_and_payload() {
        let raw = json!({
            "hashes": ["ABC", "DEF"],
            "files": ["a.safetensors"],
            "modelId": 39,
            "modelName": "dreamshaper"
        });
        let record: MetadataRecord = serde_json::from_value(raw).unwrap();

        assert!(record.hashes.contains("ABC"));
        assert!(record.files.contains("a.safetensors"));
        assert_eq!(record.payload.get("modelId"), Some(&json!(39)));
    }

    #[test]
    fn test_record_payload_roundtrip() {
        let raw = json!({
            "hashes": ["ABC"],
            "files": [],
            "modelId": 39,
            "workflows": ["{\"nodes\":[]}"]
        });
        let record: MetadataRecord = serde_json::from_value(raw.clone()).unwrap();
        let back = serde_json::to_value(&record).unwrap();

        assert_eq!(back.get("modelId"), raw.get("modelId"));
        assert_eq!(back.get("workflows"), raw.get("workflows"));
        assert_eq!(back.get("hashes"), raw.get("hashes"));
    }

    #[test]
    fn test_record_missing_sets_default_empty() {
        let record: MetadataRecord = serde_json::from_value(json!({"id": 1})).unwrap();
        assert!(record.hashes.is_empty());
        assert!(record.files.is_empty());
    }
}
