use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::info;

use crate::error::PlatformError;
use crate::training::ModelArtifact;

const POLL_EVERY: Duration = Duration::from_secs(10);

/// The two capacity models an endpoint can be provisioned under. Both serve
/// the same request/response shapes; they differ only in how compute is held.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapacityConfig {
    /// Fixed provisioned capacity, kept warm indefinitely once active.
    RealTime {
        instance_type: String,
        initial_instance_count: u32,
    },
    /// Per-request compute bounded by memory and concurrency limits.
    Serverless {
        memory_size_in_mb: u32,
        max_concurrency: u32,
    },
}

impl CapacityConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            CapacityConfig::RealTime { .. } => "real_time",
            CapacityConfig::Serverless { .. } => "serverless",
        }
    }
}

/// Deterministic serving-image reference for a runtime triple. The triple is
/// (transformers version, base framework version, python version); the image
/// tag encodes all three.
pub fn resolve_image_uri(
    framework_version: &str,
    base_framework_version: &str,
    py_version: &str,
) -> String {
    format!(
        "registry.ml.internal/huggingface-pytorch-inference:{base_framework_version}-transformers{framework_version}-{py_version}"
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointStatus {
    Creating,
    InService,
    Failed,
    Deleting,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointHandle {
    pub endpoint_name: String,
    pub model_name: String,
    pub capacity: CapacityConfig,
}

#[derive(Clone, Debug, Deserialize)]
struct EndpointDescription {
    status: EndpointStatus,
    failure_reason: Option<String>,
}

#[derive(Serialize)]
struct CreateModelRequest<'a> {
    model_name: &'a str,
    artifact_address: String,
    image_uri: &'a str,
}

#[derive(Serialize)]
struct CreateEndpointRequest<'a> {
    endpoint_name: &'a str,
    model_name: &'a str,
    capacity: &'a CapacityConfig,
}

pub struct EndpointClient {
    api_url: String,
    client: reqwest::Client,
}

impl EndpointClient {
    pub fn new(api_url: String) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a model record and an endpoint backed by it, then block until
    /// the endpoint is in service. The serving image must match the
    /// artifact's runtime triple exactly; a mismatch would otherwise surface
    /// only at request time, so it is rejected here.
    pub async fn deploy(
        &self,
        endpoint_name: &str,
        artifact: &ModelArtifact,
        capacity: CapacityConfig,
        image_uri: &str,
    ) -> Result<EndpointHandle, PlatformError> {
        let expected = resolve_image_uri(
            &artifact.framework_version,
            &artifact.base_framework_version,
            &artifact.py_version,
        );
        if image_uri != expected {
            return Err(PlatformError::ImageMismatch {
                expected,
                requested: image_uri.to_string(),
            });
        }

        let model_name = format!("{endpoint_name}-model");
        let url = format!("{}/models", self.api_url);
        self.client
            .post(&url)
            .json(&CreateModelRequest {
                model_name: &model_name,
                artifact_address: artifact.address.to_string(),
                image_uri,
            })
            .send()
            .await?
            .error_for_status()?;

        let url = format!("{}/endpoints", self.api_url);
        self.client
            .post(&url)
            .json(&CreateEndpointRequest {
                endpoint_name,
                model_name: &model_name,
                capacity: &capacity,
            })
            .send()
            .await?
            .error_for_status()?;

        info!(endpoint=%endpoint_name, kind=%capacity.kind(), "endpoint creation requested");
        self.wait_in_service(endpoint_name).await?;

        Ok(EndpointHandle {
            endpoint_name: endpoint_name.to_string(),
            model_name,
            capacity,
        })
    }

    async fn wait_in_service(&self, endpoint_name: &str) -> Result<(), PlatformError> {
        loop {
            let url = format!("{}/endpoints/{endpoint_name}", self.api_url);
            let desc: EndpointDescription = self
                .client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            match desc.status {
                EndpointStatus::InService => {
                    info!(endpoint=%endpoint_name, "endpoint in service");
                    return Ok(());
                }
                EndpointStatus::Failed => {
                    return Err(PlatformError::DeployFailed {
                        endpoint_name: endpoint_name.to_string(),
                        reason: desc
                            .failure_reason
                            .unwrap_or_else(|| "no failure reason reported".to_string()),
                    });
                }
                EndpointStatus::Creating | EndpointStatus::Deleting => {
                    sleep(POLL_EVERY).await;
                }
            }
        }
    }

    /// Release the deployment: model record first, then the endpoint.
    /// Irreversible; subsequent invocations against the name fail.
    pub async fn delete(&self, handle: &EndpointHandle) -> Result<(), PlatformError> {
        let url = format!("{}/models/{}", self.api_url, handle.model_name);
        self.client.delete(&url).send().await?.error_for_status()?;

        let url = format!("{}/endpoints/{}", self.api_url, handle.endpoint_name);
        self.client.delete(&url).send().await?.error_for_status()?;

        info!(endpoint=%handle.endpoint_name, "endpoint deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageAddress;

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            job_name: "paraphrase-ft-abc".into(),
            address: StorageAddress { bucket: "ml-data".into(), key: "output/model.tar.gz".into() },
            framework_version: "4.6.1".into(),
            base_framework_version: "1.7.1".into(),
            py_version: "py36".into(),
        }
    }

    #[test]
    fn test_resolve_image_uri_encodes_triple() {
        let uri = resolve_image_uri("4.6.1", "1.7.1", "py36");
        assert_eq!(
            uri,
            "registry.ml.internal/huggingface-pytorch-inference:1.7.1-transformers4.6.1-py36"
        );
    }

    #[test]
    fn test_capacity_config_serde_tagging() {
        let rt = CapacityConfig::RealTime {
            instance_type: "ml.g4dn.xlarge".into(),
            initial_instance_count: 1,
        };
        let sl = CapacityConfig::Serverless { memory_size_in_mb: 6144, max_concurrency: 10 };

        let rt_json = serde_json::to_value(&rt).unwrap();
        assert_eq!(rt_json["type"], "real_time");
        assert_eq!(rt_json["instance_type"], "ml.g4dn.xlarge");

        let sl_json = serde_json::to_value(&sl).unwrap();
        assert_eq!(sl_json["type"], "serverless");
        assert_eq!(sl_json["memory_size_in_mb"], 6144);
        assert_eq!(sl_json["max_concurrency"], 10);
    }

    #[test]
    fn test_mismatched_image_is_detected_before_deploy() {
        let a = artifact();
        let expected = resolve_image_uri(&a.framework_version, &a.base_framework_version, &a.py_version);
        let wrong = resolve_image_uri("4.12.0", &a.base_framework_version, &a.py_version);
        assert_ne!(expected, wrong);
    }
}
