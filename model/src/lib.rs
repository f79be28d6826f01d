//! Shared statistical model of the topic trainer.
//!
//! Sampling workers go through one contract, [`ModelAccess`], and never
//! learn whether the counters live in this process ([`LocalModel`]) or in
//! the sharded table service ([`PsModel`]). The backend is picked once at
//! process startup and never switched.

pub mod access;
pub mod error;
pub mod local;
pub mod meta;
pub mod ps;
pub mod snapshot;

pub use access::ModelAccess;
pub use counttable::Row;
pub use error::{ModelErr, Result};
pub use local::LocalModel;
pub use meta::ModelMeta;
pub use ps::{PsModel, PsTableGroup, Trainer};
pub use snapshot::{
    SnapshotReader, SnapshotSource, SnapshotWriter, WordTopicRecord, read_summary, write_summary,
};
