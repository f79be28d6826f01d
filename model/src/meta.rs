use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Static table dimensions for one training run.
///
/// Owned by the trainer process and immutable after setup; both backends
/// size their tables from it and never resize afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMeta {
    vocab_size: NonZeroUsize,
    num_topics: NonZeroUsize,
    freq_buckets: NonZeroUsize,
    doc_length_buckets: NonZeroUsize,
    #[serde(default = "default_shards")]
    shards: NonZeroUsize,
}

fn default_shards() -> NonZeroUsize {
    NonZeroUsize::MIN
}

impl ModelMeta {
    pub fn new(
        vocab_size: NonZeroUsize,
        num_topics: NonZeroUsize,
        freq_buckets: NonZeroUsize,
        doc_length_buckets: NonZeroUsize,
    ) -> Self {
        Self {
            vocab_size,
            num_topics,
            freq_buckets,
            doc_length_buckets,
            shards: default_shards(),
        }
    }

    /// Sets the shard count used by the parameter-server deployment.
    pub fn with_shards(mut self, shards: NonZeroUsize) -> Self {
        self.shards = shards;
        self
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size.get()
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics.get()
    }

    pub fn freq_buckets(&self) -> usize {
        self.freq_buckets.get()
    }

    pub fn doc_length_buckets(&self) -> usize {
        self.doc_length_buckets.get()
    }

    pub fn shards(&self) -> NonZeroUsize {
        self.shards
    }
}
