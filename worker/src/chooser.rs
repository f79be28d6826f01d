use model::ModelAccess;

/// Picks the next topic for a token.
///
/// This is the seam where the sampler's proposal and acceptance logic
/// plugs in; the implementations here are deterministic placeholders that
/// exercise the model contract without any sampling math.
pub trait TopicChooser {
    fn choose(&mut self, word_id: usize, current: usize, model: &dyn ModelAccess) -> usize;
}

/// Cycles through topics regardless of the counts. Useful for tests that
/// need a predictable reassignment pattern.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    num_topics: usize,
}

impl RoundRobin {
    pub fn new(num_topics: usize) -> Self {
        Self { num_topics }
    }
}

impl TopicChooser for RoundRobin {
    fn choose(&mut self, _word_id: usize, current: usize, _model: &dyn ModelAccess) -> usize {
        (current + 1) % self.num_topics
    }
}

/// Reassigns each token to the globally least-loaded topic.
///
/// Reads the summary row once per token and scans it, the same
/// hold-a-row-across-several-reads pattern the real sampler uses.
#[derive(Debug, Clone)]
pub struct LeastLoaded {
    num_topics: usize,
}

impl LeastLoaded {
    pub fn new(num_topics: usize) -> Self {
        Self { num_topics }
    }
}

impl TopicChooser for LeastLoaded {
    fn choose(&mut self, _word_id: usize, current: usize, model: &dyn ModelAccess) -> usize {
        let summary = model.summary_row();
        let mut best = current;
        let mut best_count = summary.get(current);

        for topic in 0..self.num_topics {
            let count = summary.get(topic);
            if count < best_count {
                best = topic;
                best_count = count;
            }
        }

        best
    }
}
