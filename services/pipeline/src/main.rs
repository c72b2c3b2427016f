mod config;
mod stages;

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use mlplatform::{EndpointClient, InvokeClient, ObjectStore, TrainingClient};

use crate::config::PipelineConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = PipelineConfig::from_env()?;

    let store = ObjectStore::new(
        cfg.s3_endpoint.clone(),
        cfg.s3_bucket.clone(),
        cfg.s3_access_key.clone(),
        cfg.s3_secret_key.clone(),
    );
    let training = TrainingClient::new(cfg.platform_api_url.clone());
    let endpoints = EndpointClient::new(cfg.platform_api_url.clone());
    let invoker = InvokeClient::new(cfg.platform_runtime_url.clone());

    let run_prefix = format!("runs/{}", Uuid::new_v4().simple());
    info!(%run_prefix, model = %cfg.model_name, "pipeline starting");

    // 1. Dataset
    let dataset = stages::acquire_dataset(&cfg).await?;

    // 2. Tokenization (blocking CPU work off the runtime)
    let cfg_tok = cfg.clone();
    let raw_train = dataset.train.clone();
    let raw_validation = dataset.validation.clone();
    let (train, validation) = tokio::task::spawn_blocking(move || {
        let ds = stages::RawDataset {
            train: raw_train,
            validation: raw_validation,
            test: Vec::new(),
        };
        stages::tokenize_dataset(&cfg_tok, &ds)
    })
    .await??;

    // 3. Publication
    let (train_addr, validation_addr) =
        stages::publish_dataset(&store, &run_prefix, &train, &validation).await?;

    // 4. Training (blocks until the remote job terminates)
    let artifact =
        stages::run_training(&training, &cfg, &run_prefix, train_addr, validation_addr).await?;
    info!(job = %artifact.job_name, artifact = %artifact.address, "model artifact ready");

    // 5. Deployment: real-time + serverless
    let (realtime, serverless) = stages::deploy_endpoints(&endpoints, &cfg, &artifact).await?;

    // 6. Single-example demo against both endpoints
    if let Some(example) = dataset.test.first() {
        stages::classify_pair(&invoker, &realtime, example).await?;
        stages::classify_pair(&invoker, &serverless, example).await?;
    }

    // 7. Full test-set evaluation on the serverless endpoint
    let report = stages::evaluate_endpoint(&invoker, &serverless, &dataset.test).await?;
    println!("{report}");

    // 8. Teardown
    stages::teardown(&endpoints, &realtime, &serverless).await?;
    info!("pipeline finished");

    Ok(())
}
