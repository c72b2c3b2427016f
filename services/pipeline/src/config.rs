use anyhow::{bail, Context, Result};

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub platform_api_url: String,
    pub platform_runtime_url: String,

    pub s3_endpoint: String,
    pub s3_bucket: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,

    pub dataset_url: String,
    pub tokenizer_file: String,
    pub model_name: String,
    pub max_seq_len: usize,

    pub entry_point: String,
    pub epochs: u32,
    pub train_batch_size: u32,

    pub instance_type: String,
    pub initial_instance_count: u32,
    pub serverless_memory_mb: u32,
    pub serverless_max_concurrency: u32,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let platform_api_url = get("PLATFORM_API_URL")?;
        let platform_runtime_url = get("PLATFORM_RUNTIME_URL")?;

        let s3_endpoint = get("S3_ENDPOINT")?;
        let s3_bucket = get("S3_BUCKET")?;
        let s3_access_key = get("S3_ACCESS_KEY")?;
        let s3_secret_key = get("S3_SECRET_KEY")?;

        let dataset_url = get("DATASET_URL")?;
        let tokenizer_file = get("TOKENIZER_FILE")?;
        let model_name =
            std::env::var("MODEL_NAME").unwrap_or_else(|_| "distilbert-base-uncased".to_string());
        let max_seq_len = get_num("MAX_SEQ_LEN", 128)?;

        let entry_point = std::env::var("ENTRY_POINT").unwrap_or_else(|_| "train.py".to_string());
        let epochs = get_num("EPOCHS", 1)?;
        let train_batch_size = get_num("TRAIN_BATCH_SIZE", 32)?;

        let instance_type =
            std::env::var("INSTANCE_TYPE").unwrap_or_else(|_| "ml.g4dn.xlarge".to_string());
        let initial_instance_count = get_num("INITIAL_INSTANCE_COUNT", 1)?;
        let serverless_memory_mb = get_num("SERVERLESS_MEMORY_MB", 6144)?;
        let serverless_max_concurrency = get_num("SERVERLESS_MAX_CONCURRENCY", 10)?;

        // Tiny sanity checks (fail fast, fail loud)
        for (name, url) in [
            ("PLATFORM_API_URL", &platform_api_url),
            ("PLATFORM_RUNTIME_URL", &platform_runtime_url),
            ("S3_ENDPOINT", &s3_endpoint),
            ("DATASET_URL", &dataset_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("{name} must start with http:// or https://");
            }
        }
        if max_seq_len == 0 {
            bail!("MAX_SEQ_LEN must be > 0");
        }

        Ok(Self {
            platform_api_url,
            platform_runtime_url,
            s3_endpoint,
            s3_bucket,
            s3_access_key,
            s3_secret_key,
            dataset_url,
            tokenizer_file,
            model_name,
            max_seq_len,
            entry_point,
            epochs,
            train_batch_size,
            instance_type,
            initial_instance_count,
            serverless_memory_mb,
            serverless_max_concurrency,
        })
    }
}

fn get(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Missing required env var: {key}"))
}

fn get_num<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.parse::<T>().with_context(|| format!("{key} is not a number: {v}")),
        Err(_) => Ok(default),
    }
}
