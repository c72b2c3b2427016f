use serde::{Deserialize, Serialize};

use pairset::{Partition, Split, TokenizedRecord};

use crate::error::PlatformError;

/// Durable object-storage address, rendered `s3://bucket/key`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAddress {
    pub bucket: String,
    pub key: String,
}

impl StorageAddress {
    pub fn parse(s: &str) -> Result<Self, PlatformError> {
        let rest = s.strip_prefix("s3://").ok_or_else(|| PlatformError::Storage {
            address: s.to_string(),
            reason: "address must start with s3://".to_string(),
        })?;
        let (bucket, key) = rest.split_once('/').ok_or_else(|| PlatformError::Storage {
            address: s.to_string(),
            reason: "address has no key component".to_string(),
        })?;
        if bucket.is_empty() || key.is_empty() {
            return Err(PlatformError::Storage {
                address: s.to_string(),
                reason: "empty bucket or key".to_string(),
            });
        }
        Ok(Self { bucket: bucket.to_string(), key: key.to_string() })
    }
}

impl std::fmt::Display for StorageAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Path-style object store client (MinIO/S3 compatible HTTP endpoint).
pub struct ObjectStore {
    endpoint: String,
    bucket: String,
    access_key: String,
    secret_key: String,
    client: reqwest::Client,
}

impl ObjectStore {
    pub fn new(endpoint: String, bucket: String, access_key: String, secret_key: String) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
            access_key,
            secret_key,
            client: reqwest::Client::new(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    pub async fn health(&self) -> Result<(), PlatformError> {
        let url = format!("{}/minio/health/live", self.endpoint);
        self.client.get(&url).send().await?.error_for_status()?;
        Ok(())
    }

    /// Write a tokenized partition as newline-delimited JSON under
    /// `{prefix}/{split}/records.jsonl`. Re-running overwrites the same
    /// address; there is no versioning.
    pub async fn put_partition(
        &self,
        partition: &Partition,
        prefix: &str,
    ) -> Result<StorageAddress, PlatformError> {
        let key = partition_key(prefix, partition.split);
        let address = StorageAddress { bucket: self.bucket.clone(), key: key.clone() };

        let body = encode_partition_body(partition).map_err(|e| PlatformError::Storage {
            address: address.to_string(),
            reason: e,
        })?;

        let resp = self
            .client
            .put(self.object_url(&key))
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PlatformError::Storage {
                address: address.to_string(),
                reason: format!("write rejected: HTTP {}", resp.status()),
            });
        }

        tracing::info!(address=%address, records=partition.records.len(), "partition published");
        Ok(address)
    }

    /// Re-read a partition previously published with [`put_partition`].
    pub async fn get_partition(&self, address: &StorageAddress) -> Result<Partition, PlatformError> {
        let split = split_from_key(&address.key).ok_or_else(|| PlatformError::Storage {
            address: address.to_string(),
            reason: "key does not name a partition split".to_string(),
        })?;

        let url = format!("{}/{}/{}", self.endpoint, address.bucket, address.key);
        let body = self
            .client
            .get(&url)
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        decode_partition_body(split, &body).map_err(|e| PlatformError::Storage {
            address: address.to_string(),
            reason: e,
        })
    }
}

/// One JSON record per line; the published file is re-readable by any
/// independent process holding the address.
pub fn encode_partition_body(partition: &Partition) -> Result<String, String> {
    let mut body = String::new();
    for rec in &partition.records {
        let line = serde_json::to_string(rec).map_err(|e| format!("serialize record: {e}"))?;
        body.push_str(&line);
        body.push('\n');
    }
    Ok(body)
}

pub fn decode_partition_body(split: Split, body: &str) -> Result<Partition, String> {
    let mut records = Vec::new();
    for (i, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let rec: TokenizedRecord =
            serde_json::from_str(line).map_err(|e| format!("line {}: {e}", i + 1))?;
        records.push(rec);
    }
    Ok(Partition { split, records })
}

pub fn partition_key(prefix: &str, split: Split) -> String {
    format!("{}/{}/records.jsonl", prefix.trim_matches('/'), split.as_str())
}

fn split_from_key(key: &str) -> Option<Split> {
    let mut segments = key.rsplit('/');
    segments.next()?; // filename
    match segments.next()? {
        "train" => Some(Split::Train),
        "validation" => Some(Split::Validation),
        "test" => Some(Split::Test),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_parse_roundtrip() {
        let a = StorageAddress { bucket: "ml-data".into(), key: "runs/7/train/records.jsonl".into() };
        let parsed = StorageAddress::parse(&a.to_string()).unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn test_address_parse_rejects_bad_scheme() {
        assert!(StorageAddress::parse("http://bucket/key").is_err());
        assert!(StorageAddress::parse("s3://bucket-only").is_err());
    }

    #[test]
    fn test_partition_key_layout() {
        assert_eq!(partition_key("runs/7", Split::Train), "runs/7/train/records.jsonl");
        assert_eq!(partition_key("/runs/7/", Split::Validation), "runs/7/validation/records.jsonl");
    }

    #[test]
    fn test_split_from_key() {
        assert_eq!(split_from_key("runs/7/train/records.jsonl"), Some(Split::Train));
        assert_eq!(split_from_key("runs/7/other/records.jsonl"), None);
        assert_eq!(split_from_key("records.jsonl"), None);
    }
}
