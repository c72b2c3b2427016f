use serde::{Deserialize, Serialize};

/// Class names for the binary paraphrase task, indexed by label.
pub const CLASS_NAMES: [&str; 2] = ["paraphrase", "not paraphrase"];

/// Delimiter placed between the two sentences of a pair when it is rendered
/// as a single inference prompt. The served model was fine-tuned on pairs
/// tokenized with exactly this separator, so the rendered string must match
/// training-time formatting byte-for-byte.
pub const PAIR_SEP: &str = " [SEP] ";

/// The single place a sentence pair is turned into an inference prompt.
pub fn format_pair(sentence1: &str, sentence2: &str) -> String {
    format!("{sentence1}{PAIR_SEP}{sentence2}")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SentencePair {
    pub sentence1: String,
    pub sentence2: String,
    pub label: u8, // 0 = paraphrase, 1 = not paraphrase
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tokenized example. Field order matters: downstream training readers
/// expect `{input_ids, attention_mask, labels}` and the label field is named
/// `labels` (plural) by that contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizedRecord {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub labels: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Partition {
    pub split: Split,
    pub records: Vec<TokenizedRecord>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
