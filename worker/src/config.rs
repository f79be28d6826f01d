use std::num::NonZeroUsize;

/// Immutable execution bounds for one training run.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    workers: NonZeroUsize,
    sweeps: usize,
}

impl WorkerConfig {
    /// Creates a new run configuration.
    ///
    /// # Args
    /// * `workers` - Number of worker threads driving the model.
    /// * `sweeps` - Full passes over the corpus; zero seeds and stops.
    pub fn new(workers: NonZeroUsize, sweeps: usize) -> Self {
        Self { workers, sweeps }
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    pub fn sweeps(&self) -> usize {
        self.sweeps
    }
}
