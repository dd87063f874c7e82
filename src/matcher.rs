//! Checkpoint-to-record matching
//!
//! Two-tier match per file: content hash membership first, filename
//! membership as a fallback, walked in stored record order. The first
//! record satisfying either tier wins and matching stops for that file;
//! files matching nothing are omitted from the result.

use crate::checkpoints::LocalCheckpoint;
use crate::metadata::MetadataRecord;
use std::collections::{BTreeMap, HashMap};

/// Map each checkpoint to its metadata record, if any
///
/// Hash lookup is keyed by base file name; result keys and filename
/// matching use the relative path.
pub fn match_checkpoints(
    checkpoints: &[LocalCheckpoint],
    hashes: &HashMap<String, String>,
    records: &[MetadataRecord],
) -> BTreeMap<String, MetadataRecord> {
    let mut matched = BTreeMap::new();

    for checkpoint in checkpoints {
        let hash = hashes.get(&checkpoint.file_name);

        for record in records {
            let hash_hit = hash.is_some_and(|h| record.hashes.contains(h));
            if hash_hit || record.files.contains(&checkpoint.relative_path) {
                matched.insert(checkpoint.relative_path.clone(), record.clone());
                break;
            }
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn checkpoint(name: &str) -> LocalCheckpoint {
        LocalCheckpoint {
            file_name: name.rsplit('/').next().unwrap().to_string(),
            relative_path: name.to_string(),
            path: PathBuf::from("/models").join(name),
        }
    }

    fn record(value: serde_json::Value) -> MetadataRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_match_by_hash() {
        let checkpoints = vec![checkpoint("a.safetensors")];
        let hashes = HashMap::from([("a.safetensors".to_string(), "ABC".to_string())]);
        let records = vec![record(json!({"hashes": ["ABC"], "files": [], "id": 1}))];

        let matched = match_checkpoints(&checkpoints, &hashes, &records);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched["a.safetensors"].payload.get("id"), Some(&json!(1)));
    }

    #[test]
    fn test_hash_match_does_not_need_filename() {
        // Hash listed, filename absent from every record
        let checkpoints = vec![checkpoint("renamed_locally.safetensors")];
        let hashes = HashMap::from([(
            "renamed_locally.safetensors".to_string(),
            "ABC".to_string(),
        )]);
        let records = vec![record(
            json!({"hashes": ["ABC"], "files": ["published_name.safetensors"], "id": 1}),
        )];

        let matched = match_checkpoints(&checkpoints, &hashes, &records);

        assert!(matched.contains_key("renamed_locally.safetensors"));
    }

    #[test]
    fn test_filename_fallback_when_hash_unknown_to_dataset() {
        let checkpoints = vec![checkpoint("a.safetensors")];
        let hashes = HashMap::from([("a.safetensors".to_string(), "UNLISTED".to_string())]);
        let records = vec![record(
            json!({"hashes": ["OTHER"], "files": ["a.safetensors"], "id": 2}),
        )];

        let matched = match_checkpoints(&checkpoints, &hashes, &records);

        assert_eq!(matched["a.safetensors"].payload.get("id"), Some(&json!(2)));
    }

    #[test]
    fn test_unmatched_file_omitted() {
        let checkpoints = vec![checkpoint("a.safetensors")];
        let hashes = HashMap::from([("a.safetensors".to_string(), "ABC".to_string())]);
        let records = vec![record(json!({"hashes": ["XYZ"], "files": ["b.ckpt"], "id": 1}))];

        let matched = match_checkpoints(&checkpoints, &hashes, &records);

        assert!(matched.is_empty());
    }

    #[test]
    fn test_first_record_wins() {
        let checkpoints = vec![checkpoint("a.safetensors")];
        let hashes = HashMap::from([("a.safetensors".to_string(), "ABC".to_string())]);
        let records = vec![
            record(json!({"hashes": ["ABC"], "files": [], "id": 1})),
            record(json!({"hashes": ["ABC"], "files": [], "id": 2})),
        ];

        let matched = match_checkpoints(&checkpoints, &hashes, &records);

        assert_eq!(matched["a.safetensors"].payload.get("id"), Some(&json!(1)));
    }

    #[test]
    fn test_earlier_filename_match_beats_later_hash_match() {
        // Single pass over records: record order decides, not match tier
        let checkpoints = vec![checkpoint("a.safetensors")];
        let hashes = HashMap::from([("a.safetensors".to_string(), "ABC".to_string())]);
        let records = vec![
            record(json!({"hashes": [], "files": ["a.safetensors"], "id": 1})),
            record(json!({"hashes": ["ABC"], "files": [], "id": 2})),
        ];

        let matched = match_checkpoints(&checkpoints, &hashes, &records);

        assert_eq!(matched["a.safetensors"].payload.get("id"), Some(&json!(1)));
    }

    #[test]
    fn test_filename_match_uses_relative_path() {
        let checkpoints = vec![checkpoint("sd15/a.safetensors")];
        let hashes = HashMap::from([("a.safetensors".to_string(), "UNLISTED".to_string())]);
        let records = vec![
            record(json!({"hashes": [], "files": ["a.safetensors"], "id": 1})),
            record(json!({"hashes": [], "files": ["sd15/a.safetensors"], "id": 2})),
        ];

        let matched = match_checkpoints(&checkpoints, &hashes, &records);

        assert_eq!(
            matched["sd15/a.safetensors"].payload.get("id"),
            Some(&json!(2))
        );
    }

    #[test]
    fn test_spec_worked_example() {
        // hash store {"a.safetensors": "ABC"}, one record claiming hash ABC
        let checkpoints = vec![checkpoint("a.safetensors")];
        let hashes = HashMap::from([("a.safetensors".to_string(), "ABC".to_string())]);
        let records = vec![record(json!({"hashes": ["ABC"], "files": [], "id": 1}))];

        let matched = match_checkpoints(&checkpoints, &hashes, &records);

        let result = serde_json::to_value(&matched).unwrap();
        assert_eq!(result["a.safetensors"]["id"], json!(1));
    }

    #[test]
    fn test_empty_records_empty_result() {
        let checkpoints = vec![checkpoint("a.safetensors")];
        let hashes = HashMap::from([("a.safetensors".to_string(), "ABC".to_string())]);

        let matched = match_checkpoints(&checkpoints, &hashes, &[]);

        assert!(matched.is_empty());
    }
}
