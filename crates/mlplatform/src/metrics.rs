use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

/// Named extractor mapping training-log lines to one metric time series.
pub struct MetricDefinition {
    pub name: &'static str,
    pub pattern: Regex,
}

const FLOAT: &str = r"([0-9]+(?:\.[0-9]+)?(?:e-?[0-9]+)?)";

fn definition(name: &'static str, key: &str) -> MetricDefinition {
    MetricDefinition {
        name,
        pattern: Regex::new(&format!(r"'{key}': {FLOAT}")).unwrap(),
    }
}

lazy_static! {
    /// The metric series the training platform is asked to extract from the
    /// entry point's log output.
    pub static ref METRIC_DEFINITIONS: Vec<MetricDefinition> = vec![
        definition("loss", "loss"),
        definition("eval_loss", "eval_loss"),
        definition("eval_accuracy", "eval_accuracy"),
        definition("eval_f1", "eval_f1"),
        definition("eval_precision", "eval_precision"),
        definition("eval_recall", "eval_recall"),
        definition("epoch", "epoch"),
    ];
}

/// Scan log lines against every metric definition. Lines matching nothing are
/// ignored; each match appends one observation to that metric's series, in
/// log order.
pub fn scan_logs(lines: &[String]) -> BTreeMap<String, Vec<f64>> {
    let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for line in lines {
        for def in METRIC_DEFINITIONS.iter() {
            if let Some(caps) = def.pattern.captures(line) {
                if let Ok(v) = caps[1].parse::<f64>() {
                    series.entry(def.name.to_string()).or_default().push(v);
                }
            }
        }
    }

    series
}
