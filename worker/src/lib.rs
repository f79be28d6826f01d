pub mod chooser;
pub mod config;
pub mod corpus;
pub mod metrics;
pub mod pool;
pub mod update;

pub use chooser::{LeastLoaded, RoundRobin, TopicChooser};
pub use config::WorkerConfig;
pub use corpus::{Document, Token};
pub use metrics::WorkerMetrics;
pub use pool::run_sweeps;
