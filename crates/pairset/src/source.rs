use crate::schema::{SentencePair, Split};
use crate::validate::{parse_split, SplitStats};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("dataset request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("dataset validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Remote source of the labeled sentence-pair dataset. Splits live at
/// `{base_url}/{split}.jsonl`, one record per line with fields
/// `sentence1`, `sentence2`, `label`.
pub struct DatasetSource {
    base_url: String,
    client: reqwest::Client,
}

impl DatasetSource {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn split_url(&self, split: Split) -> String {
        format!("{}/{}.jsonl", self.base_url, split.as_str())
    }

    /// Download one split and validate it line-by-line before returning it.
    pub async fn fetch_split(
        &self,
        split: Split,
    ) -> Result<(Vec<SentencePair>, SplitStats), SourceError> {
        let url = self.split_url(split);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_split(body.as_bytes()).map_err(SourceError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url_trims_trailing_slash() {
        let src = DatasetSource::new("http://data.local/mrpc/".to_string());
        assert_eq!(src.split_url(Split::Train), "http://data.local/mrpc/train.jsonl");
        assert_eq!(src.split_url(Split::Test), "http://data.local/mrpc/test.jsonl");
    }
}
