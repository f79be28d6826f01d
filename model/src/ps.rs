use std::num::NonZeroUsize;

use counttable::{LoadRow, Row, RowSource, ServiceBuilder, TableClient, TableId, TableOptions, TableService};
use log::info;

use crate::{ModelAccess, ModelMeta, Result};

/// The four logical tables registered with the sharded table service,
/// plus the ready service itself.
///
/// `init` is the one-time, cluster-wide setup: declare, configure, build,
/// then stream the warm-start source. It runs exactly once per training
/// job, and per-worker [`Trainer`] handles can only be minted from the
/// finished group, so no worker traffic can precede it.
#[derive(Debug)]
pub struct PsTableGroup {
    service: TableService,
    word_topic: TableId<i32>,
    summary: TableId<i64>,
    topic_frequency: TableId<i32>,
    doc_length: TableId<i32>,
}

impl PsTableGroup {
    /// Registers and populates the model tables.
    ///
    /// With a `source`, the word-topic table is bulk-loaded from it while
    /// the summary row is accumulated from the streamed entries, so the
    /// loaded state satisfies the summary invariant. Without one, the run
    /// is a cold start over zeroed tables.
    ///
    /// # Errors
    /// Table declaration conflicts and load failures; all fatal, startup
    /// must abort.
    pub fn init(meta: &ModelMeta, source: Option<&mut dyn RowSource>) -> Result<Self> {
        let mut builder = ServiceBuilder::new();

        let word_topic = builder.declare::<i32>("word_topic", meta.vocab_size(), meta.num_topics())?;
        let summary = builder.declare::<i64>("summary", 1, meta.num_topics())?;
        let topic_frequency =
            builder.declare::<i32>("topic_frequency", meta.num_topics(), meta.freq_buckets())?;
        let doc_length = builder.declare::<i32>("doc_length", 1, meta.doc_length_buckets())?;

        // Only the vocabulary-keyed table is worth spreading; the others
        // are a single row or a handful of topic rows.
        builder.configure(word_topic, TableOptions { shards: meta.shards() });
        builder.configure(topic_frequency, TableOptions { shards: one() });
        builder.configure(summary, TableOptions { shards: one() });
        builder.configure(doc_length, TableOptions { shards: one() });

        let service = builder.build();

        let group = Self {
            service,
            word_topic,
            summary,
            topic_frequency,
            doc_length,
        };

        if let Some(source) = source {
            group.load_word_topic(source)?;
        }

        info!(
            vocab = meta.vocab_size(),
            topics = meta.num_topics(),
            shards = meta.shards().get();
            "parameter-server tables ready"
        );
        Ok(group)
    }

    /// Mints the per-worker routing handle. One per worker thread.
    pub fn trainer(&self) -> Trainer {
        Trainer {
            word_topic: self.service.client(self.word_topic),
            summary: self.service.client(self.summary),
            topic_frequency: self.service.client(self.topic_frequency),
            doc_length: self.service.client(self.doc_length),
        }
    }

    fn load_word_topic(&self, source: &mut dyn RowSource) -> Result<()> {
        let summary = self.service.client(self.summary);
        let mut summing = SummingSource {
            inner: source,
            totals: vec![0i64; summary.cols()],
        };

        self.service.bulk_load(self.word_topic, &mut summing)?;

        for (topic, &total) in summing.totals.iter().enumerate() {
            if total != 0 {
                summary.add(0, topic, total);
            }
        }
        Ok(())
    }
}

/// Tees bulk-load rows through while accumulating per-topic totals for
/// the summary row.
struct SummingSource<'a> {
    inner: &'a mut dyn RowSource,
    totals: Vec<i64>,
}

impl RowSource for SummingSource<'_> {
    fn next_row(&mut self) -> std::io::Result<Option<LoadRow>> {
        let row = self.inner.next_row()?;
        if let Some(row) = &row {
            for &(col, value) in &row.entries {
                // Range violations surface from the bulk load itself.
                if col < self.totals.len() {
                    self.totals[col] += value;
                }
            }
        }
        Ok(row)
    }
}

/// Per-worker handle routing model operations to the owning shards.
///
/// Holds one table client per logical table; cheap to mint and to move
/// onto a worker thread.
pub struct Trainer {
    word_topic: TableClient<i32>,
    summary: TableClient<i64>,
    topic_frequency: TableClient<i32>,
    doc_length: TableClient<i32>,
}

/// Model backend proxying every operation through a [`Trainer`].
///
/// Holds a plain back-reference: the trainer belongs to the worker, the
/// model is just a view over it, and neither is `Clone`.
pub struct PsModel<'a> {
    trainer: &'a Trainer,
}

impl<'a> PsModel<'a> {
    pub fn new(trainer: &'a Trainer) -> Self {
        Self { trainer }
    }
}

impl ModelAccess for PsModel<'_> {
    fn word_topic_row(&self, word_id: usize) -> &Row<i32> {
        self.trainer.word_topic.row(word_id)
    }

    fn summary_row(&self) -> &Row<i64> {
        self.trainer.summary.row(0)
    }

    fn add_word_topic(&self, word_id: usize, topic_id: usize, delta: i32) {
        self.trainer.word_topic.add(word_id, topic_id, delta);
    }

    fn add_summary(&self, topic_id: usize, delta: i64) {
        self.trainer.summary.add(0, topic_id, delta);
    }

    fn topic_frequency_row(&self, topic_id: usize) -> &Row<i32> {
        self.trainer.topic_frequency.row(topic_id)
    }

    fn doc_length_row(&self) -> &Row<i32> {
        self.trainer.doc_length.row(0)
    }

    fn add_topic_frequency(&self, topic_id: usize, freq: usize, delta: i32) {
        self.trainer.topic_frequency.add(topic_id, freq, delta);
    }

    fn add_doc_length(&self, doc_len: usize, delta: i32) {
        self.trainer.doc_length.add(0, doc_len, delta);
    }
}

fn one() -> NonZeroUsize {
    NonZeroUsize::MIN
}
