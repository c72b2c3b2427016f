//! Classification report over parallel true/predicted label sequences:
//! per-class precision, recall, F1 and support, plus overall accuracy and
//! macro averages.

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("y_true has {true_len} entries but y_pred has {pred_len}")]
    LengthMismatch { true_len: usize, pred_len: usize },
    #[error("no labels to score")]
    Empty,
    #[error("label {0} outside the declared class set")]
    UnknownLabel(u8),
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassMetrics {
    pub class_name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub total: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ClassificationReport {
    pub fn compute(
        y_true: &[u8],
        y_pred: &[u8],
        class_names: &[&str],
    ) -> Result<Self, ReportError> {
        if y_true.len() != y_pred.len() {
            return Err(ReportError::LengthMismatch {
                true_len: y_true.len(),
                pred_len: y_pred.len(),
            });
        }
        if y_true.is_empty() {
            return Err(ReportError::Empty);
        }

        let n_classes = class_names.len();
        for &l in y_true.iter().chain(y_pred.iter()) {
            if l as usize >= n_classes {
                return Err(ReportError::UnknownLabel(l));
            }
        }

        // Per-class confusion counts
        let mut tp = vec![0usize; n_classes];
        let mut fp = vec![0usize; n_classes];
        let mut fn_ = vec![0usize; n_classes];
        let mut support = vec![0usize; n_classes];
        let mut correct = 0usize;

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            support[t as usize] += 1;
            if t == p {
                tp[t as usize] += 1;
                correct += 1;
            } else {
                fp[p as usize] += 1;
                fn_[t as usize] += 1;
            }
        }

        let mut classes = Vec::with_capacity(n_classes);
        for (i, name) in class_names.iter().enumerate() {
            let precision = ratio(tp[i], tp[i] + fp[i]);
            let recall = ratio(tp[i], tp[i] + fn_[i]);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            classes.push(ClassMetrics {
                class_name: name.to_string(),
                precision,
                recall,
                f1,
                support: support[i],
            });
        }

        let k = n_classes as f64;
        Ok(Self {
            macro_precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            macro_recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
            macro_f1: classes.iter().map(|c| c.f1).sum::<f64>() / k,
            accuracy: correct as f64 / y_true.len() as f64,
            total: y_true.len(),
            classes,
        })
    }
}

impl std::fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name_width = self
            .classes
            .iter()
            .map(|c| c.class_name.len())
            .max()
            .unwrap_or(0)
            .max("macro avg".len());

        writeln!(
            f,
            "{:>name_width$}  precision  recall  f1-score  support",
            ""
        )?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>name_width$}  {:>9.4}  {:>6.4}  {:>8.4}  {:>7}",
                c.class_name, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(
            f,
            "{:>name_width$}  {:>9.4}  {:>6.4}  {:>8.4}  {:>7}",
            "macro avg", self.macro_precision, self.macro_recall, self.macro_f1, self.total
        )?;
        write!(f, "{:>name_width$}  {:.4} ({} examples)", "accuracy", self.accuracy, self.total)
    }
}
