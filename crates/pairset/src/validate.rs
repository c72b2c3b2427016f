use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use serde::{Deserialize, Serialize};

use crate::schema::SentencePair;

pub type Hash32 = [u8; 32];

#[derive(Deserialize)]
struct RawPair {
    sentence1: Option<String>,
    sentence2: Option<String>,
    label: Option<i64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SplitStats {
    pub examples: u64,
    #[serde(with = "hex", rename = "split_hash_hex")]
    pub split_hash: Hash32, // BLAKE3(file bytes, line by line)
    pub label_counts: [u64; 2],
    pub avg_sentence1_len: u32,
    pub avg_sentence2_len: u32,
}

/// Parse and validate a JSONL split. Hard-fails with per-line error strings
/// on any malformed record: missing text field, missing label, or label
/// outside {0,1}.
pub fn parse_split(reader: impl BufRead) -> Result<(Vec<SentencePair>, SplitStats), Vec<String>> {
    let mut errors: Vec<String> = vec![];
    let mut pairs: Vec<SentencePair> = vec![];
    let mut hasher = blake3::Hasher::new();

    let mut label_counts = [0u64; 2];
    let mut s1_sum: u64 = 0;
    let mut s2_sum: u64 = 0;

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                errors.push(format!("Line {line_no}: IO read error: {e}"));
                continue;
            }
        };

        // Hash exact content + newline => stable hash across reads
        hasher.update(line.as_bytes());
        hasher.update(b"\n");

        if line.trim().is_empty() {
            errors.push(format!("Line {line_no}: empty line"));
            continue;
        }

        let raw: RawPair = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                errors.push(format!("Line {line_no}: invalid JSON: {e}"));
                continue;
            }
        };

        let Some(sentence1) = raw.sentence1.filter(|s| !s.trim().is_empty()) else {
            errors.push(format!("Line {line_no}: missing sentence1"));
            continue;
        };
        let Some(sentence2) = raw.sentence2.filter(|s| !s.trim().is_empty()) else {
            errors.push(format!("Line {line_no}: missing sentence2"));
            continue;
        };
        let label = match raw.label {
            Some(l @ 0..=1) => l as u8,
            Some(other) => {
                errors.push(format!("Line {line_no}: label {other} not in {{0,1}}"));
                continue;
            }
            None => {
                errors.push(format!("Line {line_no}: missing label"));
                continue;
            }
        };

        label_counts[label as usize] += 1;
        s1_sum += sentence1.len() as u64;
        s2_sum += sentence2.len() as u64;
        pairs.push(SentencePair { sentence1, sentence2, label });
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    if pairs.is_empty() {
        return Err(vec!["No valid examples found".to_string()]);
    }

    let count = pairs.len() as u64;
    let stats = SplitStats {
        examples: count,
        split_hash: hasher.finalize().into(),
        label_counts,
        avg_sentence1_len: (s1_sum / count) as u32,
        avg_sentence2_len: (s2_sum / count) as u32,
    };

    Ok((pairs, stats))
}

pub fn load_split(path: &std::path::Path) -> Result<(Vec<SentencePair>, SplitStats), Vec<String>> {
    let f = File::open(path).map_err(|e| vec![format!("IO: {e}")])?;
    parse_split(BufReader::new(f))
}
