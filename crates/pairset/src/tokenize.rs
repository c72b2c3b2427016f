use std::path::Path;

use tokenizers::{
    EncodeInput, InputSequence, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams,
};

use crate::schema::{Partition, SentencePair, Split, TokenizedRecord};

#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error("failed to load tokenizer: {0}")]
    Load(String),
    #[error("failed to encode pair: {0}")]
    Encode(String),
}

/// Pretrained tokenizer configured for sentence pairs: the concatenated pair
/// is truncated to `max_len` (longest-first, whatever the pretrained config
/// says) and padded to a fixed `max_len` so every record in a partition is
/// rectangular.
pub struct PairTokenizer {
    inner: Tokenizer,
    max_len: usize,
}

impl PairTokenizer {
    pub fn new(mut inner: Tokenizer, max_len: usize) -> Result<Self, TokenizeError> {
        inner
            .with_truncation(Some(TruncationParams {
                max_length: max_len,
                ..Default::default()
            }))
            .map_err(|e| TokenizeError::Load(e.to_string()))?;
        inner.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_len),
            ..Default::default()
        }));

        Ok(Self { inner, max_len })
    }

    pub fn from_file(path: &Path, max_len: usize) -> Result<Self, TokenizeError> {
        let inner = Tokenizer::from_file(path).map_err(|e| TokenizeError::Load(e.to_string()))?;
        Self::new(inner, max_len)
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn encode_pair(&self, pair: &SentencePair) -> Result<TokenizedRecord, TokenizeError> {
        let input = EncodeInput::Dual(
            InputSequence::from(pair.sentence1.as_str()),
            InputSequence::from(pair.sentence2.as_str()),
        );
        let encoding = self
            .inner
            .encode(input, true)
            .map_err(|e| TokenizeError::Encode(e.to_string()))?;

        Ok(TokenizedRecord {
            input_ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
            labels: pair.label,
        })
    }

    pub fn encode_partition(
        &self,
        pairs: &[SentencePair],
        split: Split,
    ) -> Result<Partition, TokenizeError> {
        let mut records = Vec::with_capacity(pairs.len());
        for pair in pairs {
            records.push(self.encode_pair(pair)?);
        }
        Ok(Partition { split, records })
    }
}
