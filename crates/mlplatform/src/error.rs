#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage error at {address}: {reason}")]
    Storage { address: String, reason: String },

    #[error("training job {job_name} failed: {reason}")]
    JobFailed { job_name: String, reason: String },

    #[error("deployment of {endpoint_name} failed: {reason}")]
    DeployFailed { endpoint_name: String, reason: String },

    #[error("container image does not match artifact runtime (expected {expected}, requested {requested})")]
    ImageMismatch { expected: String, requested: String },

    #[error("unexpected platform response: {0}")]
    BadResponse(String),

    #[error("could not parse prediction label: {0}")]
    LabelParse(String),
}
