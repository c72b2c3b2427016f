use crate::schema::Partition;
use crate::validate::Hash32;

/// Deterministic partition manifest hash:
/// - split name, then record count
/// - per record: ids, mask, label, each length-prefixed by position
pub fn partition_manifest_hash(partition: &Partition) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(partition.split.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(partition.records.len().to_string().as_bytes());
    hasher.update(b"\n");

    for rec in &partition.records {
        for id in &rec.input_ids {
            hasher.update(&id.to_le_bytes());
        }
        hasher.update(b"|");
        for m in &rec.attention_mask {
            hasher.update(&m.to_le_bytes());
        }
        hasher.update(b"|");
        hasher.update(&[rec.labels]);
        hasher.update(b"\n");
    }

    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Split, TokenizedRecord};

    fn record(ids: Vec<u32>, labels: u8) -> TokenizedRecord {
        let attention_mask = vec![1; ids.len()];
        TokenizedRecord { input_ids: ids, attention_mask, labels }
    }

    #[test]
    fn test_manifest_hash_deterministic() {
        let p = Partition {
            split: Split::Train,
            records: vec![record(vec![101, 7, 102], 0), record(vec![101, 9, 102], 1)],
        };
        assert_eq!(partition_manifest_hash(&p), partition_manifest_hash(&p));
    }

    #[test]
    fn test_manifest_hash_changes_on_label() {
        let a = Partition { split: Split::Train, records: vec![record(vec![101, 102], 0)] };
        let b = Partition { split: Split::Train, records: vec![record(vec![101, 102], 1)] };
        assert_ne!(partition_manifest_hash(&a), partition_manifest_hash(&b));
    }

    #[test]
    fn test_manifest_hash_changes_on_split() {
        let a = Partition { split: Split::Train, records: vec![record(vec![101, 102], 0)] };
        let b = Partition { split: Split::Validation, records: a.records.clone() };
        assert_ne!(partition_manifest_hash(&a), partition_manifest_hash(&b));
    }
}
