use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PlatformError;
use crate::storage::StorageAddress;

const POLL_EVERY: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub epochs: u32,
    pub train_batch_size: u32,
    pub model_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobSpec {
    pub job_name: String,
    pub entry_point: String,
    pub hyperparameters: Hyperparameters,
    pub train_data: StorageAddress,
    pub validation_data: StorageAddress,
    pub output_prefix: StorageAddress,
}

impl JobSpec {
    /// Job names must be unique per submission; suffix a short uuid.
    pub fn unique_name(prefix: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{prefix}-{}", &id[..12])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// Trained model output plus the runtime triple it was produced with. The
/// triple must match the serving image exactly or inference fails at request
/// time instead of deploy time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub job_name: String,
    pub address: StorageAddress,
    pub framework_version: String,
    pub base_framework_version: String,
    pub py_version: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct JobDescription {
    pub job_name: String,
    pub status: JobStatus,
    pub failure_reason: Option<String>,
    pub artifact: Option<ModelArtifact>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SubmittedJob {
    pub job_name: String,
    pub status: JobStatus,
}

pub struct TrainingClient {
    api_url: String,
    client: reqwest::Client,
}

impl TrainingClient {
    pub fn new(api_url: String) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn submit(&self, spec: &JobSpec) -> Result<SubmittedJob, PlatformError> {
        let url = format!("{}/training/jobs", self.api_url);
        let resp = self.client.post(&url).json(spec).send().await?.error_for_status()?;
        let job: SubmittedJob = resp.json().await?;
        info!(job_name=%job.job_name, "training job submitted");
        Ok(job)
    }

    pub async fn describe(&self, job_name: &str) -> Result<JobDescription, PlatformError> {
        let url = format!("{}/training/jobs/{job_name}", self.api_url);
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Block until the job reaches a terminal state. A failed job has no
    /// usable artifact and is not retried.
    pub async fn wait_for_completion(&self, job_name: &str) -> Result<ModelArtifact, PlatformError> {
        loop {
            let desc = self.describe(job_name).await?;
            match desc.status {
                JobStatus::Succeeded => {
                    info!(job_name=%job_name, "training job succeeded");
                    return desc.artifact.ok_or_else(|| {
                        PlatformError::BadResponse(format!(
                            "job {job_name} succeeded without an artifact"
                        ))
                    });
                }
                JobStatus::Failed => {
                    let reason = desc
                        .failure_reason
                        .unwrap_or_else(|| "no failure reason reported".to_string());
                    warn!(job_name=%job_name, %reason, "training job failed");
                    return Err(PlatformError::JobFailed {
                        job_name: job_name.to_string(),
                        reason,
                    });
                }
                JobStatus::Pending | JobStatus::Running => {
                    sleep(POLL_EVERY).await;
                }
            }
        }
    }

    pub async fn fetch_logs(&self, job_name: &str) -> Result<Vec<String>, PlatformError> {
        let url = format!("{}/training/jobs/{job_name}/logs", self.api_url);
        let body = self.client.get(&url).send().await?.error_for_status()?.text().await?;
        Ok(body.lines().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_is_unique_and_prefixed() {
        let a = JobSpec::unique_name("paraphrase-ft");
        let b = JobSpec::unique_name("paraphrase-ft");
        assert!(a.starts_with("paraphrase-ft-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_job_description_parses_platform_payload() {
        let desc: JobDescription = serde_json::from_str(
            r#"{
                "job_name": "paraphrase-ft-abc123",
                "status": "succeeded",
                "failure_reason": null,
                "artifact": {
                    "job_name": "paraphrase-ft-abc123",
                    "address": {"bucket": "ml-data", "key": "output/model.tar.gz"},
                    "framework_version": "4.6.1",
                    "base_framework_version": "1.7.1",
                    "py_version": "py36"
                },
                "created_at": "2021-06-01T12:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(desc.status, JobStatus::Succeeded);
        assert_eq!(desc.artifact.unwrap().framework_version, "4.6.1");
    }
}
