use mlplatform::{
    decode_partition_body, encode_partition_body, parse_label, partition_key, resolve_image_uri,
    scan_logs, CapacityConfig, EndpointHandle, Hyperparameters, JobSpec, StorageAddress,
};
use pairset::{Partition, Split, TokenizedRecord};

fn sample_partition(n: usize) -> Partition {
    let records = (0..n)
        .map(|i| TokenizedRecord {
            input_ids: vec![101, 2000 + i as u32, 102, 0, 0, 0, 0, 0],
            attention_mask: vec![1, 1, 1, 0, 0, 0, 0, 0],
            labels: (i % 2) as u8,
        })
        .collect();
    Partition { split: Split::Train, records }
}

#[test]
fn test_partition_body_roundtrip_preserves_count_and_order() {
    let partition = sample_partition(50);
    let body = encode_partition_body(&partition).unwrap();
    let restored = decode_partition_body(Split::Train, &body).unwrap();

    assert_eq!(restored.records.len(), partition.records.len());
    for (a, b) in partition.records.iter().zip(restored.records.iter()) {
        assert_eq!(a.input_ids, b.input_ids);
        assert_eq!(a.attention_mask, b.attention_mask);
        assert_eq!(a.labels, b.labels);
    }

    // Field order on the wire: input_ids, attention_mask, labels
    let first_line = body.lines().next().unwrap();
    let ids_at = first_line.find("input_ids").unwrap();
    let mask_at = first_line.find("attention_mask").unwrap();
    let labels_at = first_line.find("labels").unwrap();
    assert!(ids_at < mask_at && mask_at < labels_at);
}

#[test]
fn test_publication_address_is_stable_across_reruns() {
    // Re-running the same prefix targets the same key: overwrite, no versioning.
    let a = partition_key("runs/alpha", Split::Train);
    let b = partition_key("runs/alpha", Split::Train);
    assert_eq!(a, b);

    let addr = StorageAddress { bucket: "ml-data".to_string(), key: a };
    assert_eq!(addr.to_string(), "s3://ml-data/runs/alpha/train/records.jsonl");
    assert_eq!(StorageAddress::parse(&addr.to_string()).unwrap(), addr);
}

#[test]
fn test_job_spec_serializes_full_submission_payload() {
    let spec = JobSpec {
        job_name: JobSpec::unique_name("paraphrase-ft"),
        entry_point: "train.py".to_string(),
        hyperparameters: Hyperparameters {
            epochs: 1,
            train_batch_size: 32,
            model_name: "distilbert-base-uncased".to_string(),
        },
        train_data: StorageAddress::parse("s3://ml-data/runs/a/train/records.jsonl").unwrap(),
        validation_data: StorageAddress::parse("s3://ml-data/runs/a/validation/records.jsonl")
            .unwrap(),
        output_prefix: StorageAddress::parse("s3://ml-data/runs/a/output").unwrap(),
    };

    let v = serde_json::to_value(&spec).unwrap();
    assert!(v["job_name"].as_str().unwrap().starts_with("paraphrase-ft-"));
    assert_eq!(v["hyperparameters"]["epochs"], 1);
    assert_eq!(v["hyperparameters"]["train_batch_size"], 32);
    assert_eq!(v["hyperparameters"]["model_name"], "distilbert-base-uncased");
    assert_eq!(v["train_data"]["bucket"], "ml-data");
}

#[test]
fn test_metric_extraction_over_realistic_log_stream() {
    let logs: Vec<String> = vec![
        "2021-06-01 12:00:01 Downloading distilbert-base-uncased".to_string(),
        "***** Running training *****".to_string(),
        "{'loss': 0.6833, 'learning_rate': 3e-05, 'epoch': 0.37}".to_string(),
        "{'loss': 0.5121, 'learning_rate': 2e-05, 'epoch': 0.73}".to_string(),
        "***** Running Evaluation *****".to_string(),
        "{'eval_loss': 0.4214, 'eval_accuracy': 0.8456, 'eval_f1': 0.8911, 'eval_precision': 0.8677, 'eval_recall': 0.9158, 'epoch': 1.0}".to_string(),
        "Saving model checkpoint".to_string(),
    ];

    let series = scan_logs(&logs);
    assert_eq!(series["loss"].len(), 2);
    assert_eq!(series["epoch"], vec![0.37, 0.73, 1.0]);
    assert_eq!(series["eval_precision"], vec![0.8677]);
    assert_eq!(series["eval_recall"], vec![0.9158]);
    assert!(!series.contains_key("learning_rate"));
}

#[test]
fn test_two_capacity_models_share_payload_contract() {
    let realtime = EndpointHandle {
        endpoint_name: "paraphrase-ft-abc-rt".to_string(),
        model_name: "paraphrase-ft-abc-rt-model".to_string(),
        capacity: CapacityConfig::RealTime {
            instance_type: "ml.g4dn.xlarge".to_string(),
            initial_instance_count: 1,
        },
    };
    let serverless = EndpointHandle {
        endpoint_name: "paraphrase-ft-abc-sl".to_string(),
        model_name: "paraphrase-ft-abc-sl-model".to_string(),
        capacity: CapacityConfig::Serverless { memory_size_in_mb: 6144, max_concurrency: 10 },
    };

    assert_ne!(realtime.endpoint_name, serverless.endpoint_name);
    assert_ne!(realtime.capacity, serverless.capacity);
    assert_ne!(realtime.capacity.kind(), serverless.capacity.kind());

    // Both responses parse through the same label contract.
    for label in ["LABEL_0", "LABEL_1"] {
        assert!(parse_label(label).is_ok());
    }
}

#[test]
fn test_image_uri_is_a_pure_function_of_the_triple() {
    let a = resolve_image_uri("4.6.1", "1.7.1", "py36");
    let b = resolve_image_uri("4.6.1", "1.7.1", "py36");
    let c = resolve_image_uri("4.6.1", "1.8.0", "py36");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.contains("transformers4.6.1"));
}
