//! The counter choreography around token assignments.
//!
//! Every mutation of the shared model goes through delta-adds, so the
//! same calls work against either backend and interleave freely across
//! workers.

use model::{ModelAccess, ModelMeta};

use crate::corpus::Document;

/// Registers an assigned corpus into a freshly initialized model:
/// doc-length buckets, word-topic counts and the summary row.
pub fn seed_corpus<M: ModelAccess>(model: &M, meta: &ModelMeta, docs: &[Document]) {
    for doc in docs {
        let bucket = doc.len().min(meta.doc_length_buckets() - 1);
        model.add_doc_length(bucket, 1);

        for token in &doc.tokens {
            model.add_word_topic(token.word, token.topic, 1);
            model.add_summary(token.topic, 1);
        }
    }
}

/// Tallies the per-topic frequency histogram of the word-topic table into
/// the topic-frequency table. Intended to run once against a freshly
/// seeded model; counts above the last bucket clamp into it.
pub fn tally_topic_frequency<M: ModelAccess>(model: &M, meta: &ModelMeta) {
    let top = meta.freq_buckets() - 1;

    for word in 0..meta.vocab_size() {
        let row = model.word_topic_row(word);
        for topic in 0..meta.num_topics() {
            let count = row.get(topic);
            if count > 0 {
                let bucket = (count as usize).min(top);
                model.add_topic_frequency(topic, bucket, 1);
            }
        }
    }
}

/// Moves one token from `old` to `new`, keeping word-topic and summary in
/// step. Returns whether anything changed.
pub fn move_token<M: ModelAccess>(model: &M, word: usize, old: usize, new: usize) -> bool {
    if old == new {
        return false;
    }

    model.add_word_topic(word, old, -1);
    model.add_summary(old, -1);
    model.add_word_topic(word, new, 1);
    model.add_summary(new, 1);
    true
}
