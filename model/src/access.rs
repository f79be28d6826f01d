use counttable::Row;

/// Uniform access to the shared topic-model counters.
///
/// Every sampling worker drives one of the two backends through this
/// contract, once per token processed. Ids are expected to have been
/// validated at corpus-load time: an out-of-range key is a caller bug and
/// panics immediately rather than returning an error.
///
/// Row references borrow storage whose dimensions are fixed for the whole
/// run, so they stay valid across subsequent calls; reads through a held
/// reference observe concurrent delta-adds as they land. Readers must
/// tolerate momentarily interleaved values, which the sampler does by
/// design.
pub trait ModelAccess {
    /// Per-topic occurrence counts of one word.
    fn word_topic_row(&self, word_id: usize) -> &Row<i32>;

    /// Per-topic totals across all words.
    fn summary_row(&self) -> &Row<i64>;

    /// Applies `delta` to the (word, topic) counter.
    fn add_word_topic(&self, word_id: usize, topic_id: usize, delta: i32);

    /// Applies `delta` to the global per-topic total.
    fn add_summary(&self, topic_id: usize, delta: i64);

    /// Per-frequency-bucket counts for one topic.
    fn topic_frequency_row(&self, topic_id: usize) -> &Row<i32>;

    /// The document-length bucket distribution.
    fn doc_length_row(&self) -> &Row<i32>;

    /// Applies `delta` to the (topic, frequency bucket) counter.
    fn add_topic_frequency(&self, topic_id: usize, freq: usize, delta: i32);

    /// Applies `delta` to one document-length bucket.
    fn add_doc_length(&self, doc_len: usize, delta: i32);
}

/// A shared reference to a backend is itself a backend; worker threads
/// borrow one store instead of owning it.
impl<M: ModelAccess + ?Sized> ModelAccess for &M {
    fn word_topic_row(&self, word_id: usize) -> &Row<i32> {
        (**self).word_topic_row(word_id)
    }

    fn summary_row(&self) -> &Row<i64> {
        (**self).summary_row()
    }

    fn add_word_topic(&self, word_id: usize, topic_id: usize, delta: i32) {
        (**self).add_word_topic(word_id, topic_id, delta);
    }

    fn add_summary(&self, topic_id: usize, delta: i64) {
        (**self).add_summary(topic_id, delta);
    }

    fn topic_frequency_row(&self, topic_id: usize) -> &Row<i32> {
        (**self).topic_frequency_row(topic_id)
    }

    fn doc_length_row(&self) -> &Row<i32> {
        (**self).doc_length_row()
    }

    fn add_topic_frequency(&self, topic_id: usize, freq: usize, delta: i32) {
        (**self).add_topic_frequency(topic_id, freq, delta);
    }

    fn add_doc_length(&self, doc_len: usize, delta: i32) {
        (**self).add_doc_length(doc_len, delta);
    }
}
