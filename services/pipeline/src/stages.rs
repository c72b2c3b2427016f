use anyhow::{anyhow, Context, Result};
use tracing::info;

use evalreport::ClassificationReport;
use mlplatform::{
    scan_logs, CapacityConfig, EndpointClient, EndpointHandle, Hyperparameters, InvokeClient,
    JobSpec, ModelArtifact, ObjectStore, Prediction, StorageAddress, TrainingClient,
};
use pairset::{
    format_pair, partition_manifest_hash, DatasetSource, PairTokenizer, Partition, SentencePair,
    Split, CLASS_NAMES,
};

use crate::config::PipelineConfig;

pub struct RawDataset {
    pub train: Vec<SentencePair>,
    pub validation: Vec<SentencePair>,
    pub test: Vec<SentencePair>,
}

/// Stage 1: download and validate all three splits.
pub async fn acquire_dataset(cfg: &PipelineConfig) -> Result<RawDataset> {
    let source = DatasetSource::new(cfg.dataset_url.clone());

    let mut loaded = Vec::new();
    for split in [Split::Train, Split::Validation, Split::Test] {
        let (pairs, stats) = source
            .fetch_split(split)
            .await
            .with_context(|| format!("fetching {split} split"))?;
        info!(
            %split,
            examples = stats.examples,
            split_hash = %hex::encode(stats.split_hash),
            "split acquired"
        );
        loaded.push(pairs);
    }

    let mut it = loaded.into_iter();
    Ok(RawDataset {
        train: it.next().unwrap_or_default(),
        validation: it.next().unwrap_or_default(),
        test: it.next().unwrap_or_default(),
    })
}

/// Stage 2: tokenize the train and validation splits into rectangular
/// partitions. The test split stays raw: inference consumes template-wrapped
/// text, not token ids.
pub fn tokenize_dataset(
    cfg: &PipelineConfig,
    dataset: &RawDataset,
) -> Result<(Partition, Partition)> {
    let tokenizer =
        PairTokenizer::from_file(std::path::Path::new(&cfg.tokenizer_file), cfg.max_seq_len)
            .context("loading pretrained tokenizer")?;

    let train = tokenizer
        .encode_partition(&dataset.train, Split::Train)
        .context("tokenizing train split")?;
    let validation = tokenizer
        .encode_partition(&dataset.validation, Split::Validation)
        .context("tokenizing validation split")?;

    info!(
        train = train.len(),
        validation = validation.len(),
        max_len = tokenizer.max_len(),
        "splits tokenized"
    );
    Ok((train, validation))
}

/// Stage 3: publish tokenized partitions to object storage under the run
/// prefix. Re-running a prefix overwrites in place.
pub async fn publish_dataset(
    store: &ObjectStore,
    prefix: &str,
    train: &Partition,
    validation: &Partition,
) -> Result<(StorageAddress, StorageAddress)> {
    store.health().await.context("object store liveness")?;

    let train_addr = store.put_partition(train, prefix).await?;
    let validation_addr = store.put_partition(validation, prefix).await?;
    info!(
        train = %train_addr,
        validation = %validation_addr,
        train_manifest = %hex::encode(partition_manifest_hash(train)),
        validation_manifest = %hex::encode(partition_manifest_hash(validation)),
        "partitions published"
    );
    Ok((train_addr, validation_addr))
}

/// Stage 4: submit the managed training job and block until it terminates,
/// then pull metric series out of the job logs.
pub async fn run_training(
    client: &TrainingClient,
    cfg: &PipelineConfig,
    run_prefix: &str,
    train_data: StorageAddress,
    validation_data: StorageAddress,
) -> Result<ModelArtifact> {
    let spec = JobSpec {
        job_name: JobSpec::unique_name("paraphrase-ft"),
        entry_point: cfg.entry_point.clone(),
        hyperparameters: Hyperparameters {
            epochs: cfg.epochs,
            train_batch_size: cfg.train_batch_size,
            model_name: cfg.model_name.clone(),
        },
        train_data,
        validation_data,
        output_prefix: StorageAddress {
            bucket: cfg.s3_bucket.clone(),
            key: format!("{run_prefix}/output"),
        },
    };

    let submitted = client.submit(&spec).await?;
    let artifact = client.wait_for_completion(&submitted.job_name).await?;

    let logs = client.fetch_logs(&submitted.job_name).await?;
    let series = scan_logs(&logs);
    for (name, values) in &series {
        if let Some(last) = values.last() {
            info!(metric = %name, observations = values.len(), last, "training metric");
        }
    }

    Ok(artifact)
}

/// Stage 5: deploy the artifact twice, once per capacity model. Distinct
/// names, independent lifecycles, identical payload contract.
pub async fn deploy_endpoints(
    client: &EndpointClient,
    cfg: &PipelineConfig,
    artifact: &ModelArtifact,
) -> Result<(EndpointHandle, EndpointHandle)> {
    let image_uri = mlplatform::resolve_image_uri(
        &artifact.framework_version,
        &artifact.base_framework_version,
        &artifact.py_version,
    );

    let realtime = client
        .deploy(
            &format!("{}-rt", artifact.job_name),
            artifact,
            CapacityConfig::RealTime {
                instance_type: cfg.instance_type.clone(),
                initial_instance_count: cfg.initial_instance_count,
            },
            &image_uri,
        )
        .await?;

    let serverless = client
        .deploy(
            &format!("{}-sl", artifact.job_name),
            artifact,
            CapacityConfig::Serverless {
                memory_size_in_mb: cfg.serverless_memory_mb,
                max_concurrency: cfg.serverless_max_concurrency,
            },
            &image_uri,
        )
        .await?;

    Ok((realtime, serverless))
}

/// Stage 6: single-example demo against one endpoint. One call; the result
/// carries both the label and the confidence.
pub async fn classify_pair(
    client: &InvokeClient,
    handle: &EndpointHandle,
    pair: &SentencePair,
) -> Result<Prediction> {
    let prompt = format_pair(&pair.sentence1, &pair.sentence2);
    let prediction = client.invoke(handle, &prompt).await?;
    info!(
        endpoint = %handle.endpoint_name,
        predicted = CLASS_NAMES[prediction.label as usize],
        score = prediction.score,
        "single-pair prediction"
    );
    Ok(prediction)
}

/// Stage 7: full test-set evaluation, one request per record, strictly
/// sequential, predictions collected in issue order.
pub async fn evaluate_endpoint(
    client: &InvokeClient,
    handle: &EndpointHandle,
    test: &[SentencePair],
) -> Result<ClassificationReport> {
    let mut y_true = Vec::with_capacity(test.len());
    let mut y_pred = Vec::with_capacity(test.len());

    for (i, pair) in test.iter().enumerate() {
        let prompt = format_pair(&pair.sentence1, &pair.sentence2);
        let prediction = client
            .invoke(handle, &prompt)
            .await
            .with_context(|| format!("invoking {} for test record {i}", handle.endpoint_name))?;
        y_true.push(pair.label);
        y_pred.push(prediction.label);

        if (i + 1) % 500 == 0 {
            info!(endpoint = %handle.endpoint_name, done = i + 1, total = test.len(), "evaluation progress");
        }
    }

    ClassificationReport::compute(&y_true, &y_pred, &CLASS_NAMES)
        .map_err(|e| anyhow!("classification report: {e}"))
}

/// Stage 8: release both deployments, model record first then endpoint,
/// real-time then serverless. Irreversible.
pub async fn teardown(
    client: &EndpointClient,
    realtime: &EndpointHandle,
    serverless: &EndpointHandle,
) -> Result<()> {
    client.delete(realtime).await?;
    client.delete(serverless).await?;
    Ok(())
}
