use std::ops::Range;

use model::ModelMeta;
use rand::Rng;

/// One token occurrence with its current topic assignment.
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub word: usize,
    pub topic: usize,
}

/// A tokenized document. Ingestion proper lives outside this crate; this
/// is the boundary shape the sweep driver mutates.
#[derive(Debug, Clone)]
pub struct Document {
    pub tokens: Vec<Token>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Generates a random assigned corpus within the meta's id ranges.
pub fn synthetic<R: Rng>(
    meta: &ModelMeta,
    num_docs: usize,
    max_doc_len: usize,
    rng: &mut R,
) -> Vec<Document> {
    (0..num_docs)
        .map(|_| {
            let len = rng.random_range(1..=max_doc_len);
            let tokens = (0..len)
                .map(|_| Token {
                    word: rng.random_range(0..meta.vocab_size()),
                    topic: rng.random_range(0..meta.num_topics()),
                })
                .collect();
            Document { tokens }
        })
        .collect()
}

/// Splits `total` documents among `num_workers` and returns the shard for
/// `worker_id`.
///
/// Properties:
/// - Ranges are contiguous, disjoint and cover `[0..total)`.
/// - Sizes differ by at most 1 (balanced partition).
pub fn shard_range(total: usize, worker_id: usize, num_workers: usize) -> Range<usize> {
    assert!(num_workers > 0);
    assert!(worker_id < num_workers);

    let base = total / num_workers;
    let rem = total % num_workers;

    let start = worker_id * base + worker_id.min(rem);
    let extra = if worker_id < rem { 1 } else { 0 };
    let end = start + base + extra;

    start..end
}

/// Cuts the corpus into one balanced, disjoint shard per worker.
pub fn split_balanced(mut docs: &mut [Document], num_workers: usize) -> Vec<&mut [Document]> {
    let total = docs.len();
    let mut shards = Vec::with_capacity(num_workers);

    for worker_id in 0..num_workers {
        let range = shard_range(total, worker_id, num_workers);
        let (head, rest) = docs.split_at_mut(range.len());
        shards.push(head);
        docs = rest;
    }

    shards
}
