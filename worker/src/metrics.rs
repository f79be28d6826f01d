/// Per-worker counters, merged into run totals once threads join.
#[derive(Debug, Default, Clone)]
pub struct WorkerMetrics {
    pub tokens: u64,
    pub moves: u64,
    pub sweeps: u64,
}

impl WorkerMetrics {
    #[inline]
    pub fn bump_sweep(&mut self) {
        self.sweeps += 1;
    }

    #[inline]
    pub fn bump_token(&mut self) {
        self.tokens += 1;
    }

    #[inline]
    pub fn bump_move(&mut self) {
        self.moves += 1;
    }

    pub fn merge(&mut self, other: &WorkerMetrics) {
        self.tokens += other.tokens;
        self.moves += other.moves;
        self.sweeps += other.sweeps;
    }
}
