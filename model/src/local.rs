use std::io::Read;

use counttable::{CountTable, Row};
use log::{debug, info};

use crate::{ModelAccess, ModelErr, ModelMeta, Result, SnapshotReader};

/// Model backend holding all four count tables in process memory.
///
/// Tables are created zero-filled and optionally populated from a
/// snapshot, then mutated in place for the rest of the run. Constructors
/// return only ready values, so nothing can observe a half-initialized
/// store. `LocalModel` exclusively owns its storage and is deliberately
/// not `Clone`; workers share it by reference.
#[derive(Debug)]
pub struct LocalModel {
    word_topic: CountTable<i32>,
    summary: CountTable<i64>,
    topic_frequency: CountTable<i32>,
    doc_length: CountTable<i32>,
}

impl LocalModel {
    /// Cold start: every counter at zero.
    pub fn cold(meta: &ModelMeta) -> Self {
        let model = Self::create_tables(meta);
        info!(vocab = meta.vocab_size(), topics = meta.num_topics(); "cold-started local model");
        model
    }

    /// Warm start from a word-topic snapshot.
    ///
    /// The summary row is derived incrementally while word rows are read,
    /// so the loaded state satisfies the summary invariant by
    /// construction.
    ///
    /// # Errors
    /// Unreadable or malformed snapshots, and snapshots whose dimensions
    /// disagree with `meta`. All fatal at startup.
    pub fn warm<R: Read>(meta: &ModelMeta, word_topic: R) -> Result<Self> {
        let model = Self::create_tables(meta);
        model.load_word_topic_table(meta, word_topic, true)?;
        info!(vocab = meta.vocab_size(), topics = meta.num_topics(); "warm-started local model");
        Ok(model)
    }

    /// Warm start with the summary row loaded from its own snapshot
    /// instead of derived; the secondary path for deployments that persist
    /// the summary independently.
    pub fn warm_with_summary<R: Read, S: Read>(
        meta: &ModelMeta,
        word_topic: R,
        summary: S,
    ) -> Result<Self> {
        let model = Self::create_tables(meta);
        model.load_word_topic_table(meta, word_topic, false)?;
        model.load_summary_table(meta, summary)?;
        info!(vocab = meta.vocab_size(), topics = meta.num_topics(); "warm-started local model");
        Ok(model)
    }

    fn create_tables(meta: &ModelMeta) -> Self {
        Self {
            word_topic: CountTable::zeroed(meta.vocab_size(), meta.num_topics()),
            summary: CountTable::zeroed(1, meta.num_topics()),
            topic_frequency: CountTable::zeroed(meta.num_topics(), meta.freq_buckets()),
            doc_length: CountTable::zeroed(1, meta.doc_length_buckets()),
        }
    }

    fn load_word_topic_table<R: Read>(
        &self,
        meta: &ModelMeta,
        reader: R,
        derive_summary: bool,
    ) -> Result<()> {
        let mut reader = SnapshotReader::new(reader)?;
        if reader.num_topics() != meta.num_topics() {
            return Err(ModelErr::TopicCountMismatch {
                found: reader.num_topics(),
                expected: meta.num_topics(),
            });
        }

        let mut rows = 0u64;
        while let Some(record) = reader.next_record()? {
            if record.word_id >= meta.vocab_size() {
                return Err(ModelErr::SnapshotKeyOutOfRange {
                    key: record.word_id,
                    bound: meta.vocab_size(),
                });
            }

            for &(topic, count) in &record.entries {
                self.word_topic.add(record.word_id, topic, count);
                if derive_summary {
                    self.summary.add(0, topic, i64::from(count));
                }
            }
            rows += 1;
        }

        debug!(rows = rows; "loaded word-topic table");
        Ok(())
    }

    fn load_summary_table<S: Read>(&self, meta: &ModelMeta, reader: S) -> Result<()> {
        let counts = crate::snapshot::read_summary(reader)?;
        if counts.len() != meta.num_topics() {
            return Err(ModelErr::TopicCountMismatch {
                found: counts.len(),
                expected: meta.num_topics(),
            });
        }

        for (topic, &count) in counts.iter().enumerate() {
            self.summary.add(0, topic, count);
        }

        debug!(topics = counts.len(); "loaded summary table");
        Ok(())
    }
}

impl ModelAccess for LocalModel {
    fn word_topic_row(&self, word_id: usize) -> &Row<i32> {
        self.word_topic.row(word_id)
    }

    fn summary_row(&self) -> &Row<i64> {
        self.summary.row(0)
    }

    fn add_word_topic(&self, word_id: usize, topic_id: usize, delta: i32) {
        self.word_topic.add(word_id, topic_id, delta);
    }

    fn add_summary(&self, topic_id: usize, delta: i64) {
        self.summary.add(0, topic_id, delta);
    }

    fn topic_frequency_row(&self, topic_id: usize) -> &Row<i32> {
        self.topic_frequency.row(topic_id)
    }

    fn doc_length_row(&self) -> &Row<i32> {
        self.doc_length.row(0)
    }

    fn add_topic_frequency(&self, topic_id: usize, freq: usize, delta: i32) {
        self.topic_frequency.add(topic_id, freq, delta);
    }

    fn add_doc_length(&self, doc_len: usize, delta: i32) {
        self.doc_length.add(0, doc_len, delta);
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, num::NonZeroUsize};

    use super::*;
    use crate::SnapshotWriter;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn meta(vocab: usize, topics: usize) -> ModelMeta {
        ModelMeta::new(nz(vocab), nz(topics), nz(4), nz(8))
    }

    #[test]
    fn test_cold_start_scenario() {
        let model = LocalModel::cold(&meta(3, 2));

        model.add_word_topic(0, 0, 1);
        model.add_word_topic(0, 0, 2);
        model.add_summary(0, 3);

        assert_eq!(model.word_topic_row(0).get(0), 3);
        assert_eq!(model.summary_row().get(0), 3);
        assert_eq!(model.word_topic_row(0).get(1), 0);
        assert_eq!(model.summary_row().get(1), 0);
    }

    #[test]
    fn test_warm_start_reads_snapshot_and_derives_summary() {
        let mut writer = SnapshotWriter::new(Vec::new(), 2).unwrap();
        writer.write_entries(5, &[(1, 7)]).unwrap();
        writer.write_entries(2, &[(0, 3), (1, 1)]).unwrap();
        let bytes = writer.finish().unwrap();

        let model = LocalModel::warm(&meta(8, 2), Cursor::new(bytes)).unwrap();

        assert_eq!(model.word_topic_row(5).get(1), 7);
        assert_eq!(model.word_topic_row(2).to_vec(), [3, 1]);
        assert_eq!(model.summary_row().to_vec(), [3, 8]);
    }

    #[test]
    fn test_warm_start_with_independent_summary() {
        let mut writer = SnapshotWriter::new(Vec::new(), 2).unwrap();
        writer.write_entries(0, &[(0, 4)]).unwrap();
        let word_topic = writer.finish().unwrap();

        let mut summary = Vec::new();
        crate::snapshot::write_summary(&mut summary, &[4, 0]).unwrap();

        let model = LocalModel::warm_with_summary(
            &meta(4, 2),
            Cursor::new(word_topic),
            Cursor::new(summary),
        )
        .unwrap();

        assert_eq!(model.word_topic_row(0).get(0), 4);
        assert_eq!(model.summary_row().to_vec(), [4, 0]);
    }

    #[test]
    fn test_warm_start_rejects_key_past_vocab() {
        let mut writer = SnapshotWriter::new(Vec::new(), 2).unwrap();
        writer.write_entries(3, &[(0, 1)]).unwrap();
        let bytes = writer.finish().unwrap();

        let err = LocalModel::warm(&meta(3, 2), Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ModelErr::SnapshotKeyOutOfRange { key: 3, bound: 3 }));
    }

    #[test]
    fn test_warm_start_rejects_topic_count_mismatch() {
        let writer = SnapshotWriter::new(Vec::new(), 5).unwrap();
        let bytes = writer.finish().unwrap();

        let err = LocalModel::warm(&meta(3, 2), Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ModelErr::TopicCountMismatch { found: 5, expected: 2 }));
    }

    #[test]
    fn test_other_tables_cover_their_buckets() {
        let model = LocalModel::cold(&meta(3, 2));

        model.add_topic_frequency(1, 3, 2);
        model.add_doc_length(7, 1);

        assert_eq!(model.topic_frequency_row(1).get(3), 2);
        assert_eq!(model.doc_length_row().get(7), 1);
    }

    #[test]
    #[should_panic(expected = "key 3 out of range")]
    fn test_word_id_one_past_vocab_panics() {
        let model = LocalModel::cold(&meta(3, 2));
        model.word_topic_row(3);
    }
}
