use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use counttable::TableErr;

/// The model module's result type.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// Initialization failures: unreadable or malformed snapshots, or table
/// service declaration problems.
///
/// All of these are fatal at startup. The trainer cannot proceed with a
/// missing or inconsistent model, and nothing here is recovered by
/// substituting defaults.
#[derive(Debug)]
pub enum ModelErr {
    Io(io::Error),
    BadMagic {
        found: u32,
        expected: u32,
    },
    BadVersion {
        found: u32,
    },
    TopicCountMismatch {
        found: usize,
        expected: usize,
    },
    SnapshotKeyOutOfRange {
        key: usize,
        bound: usize,
    },
    SnapshotColumnOutOfRange {
        key: usize,
        column: usize,
        bound: usize,
    },
    Table(TableErr),
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::Io(e) => write!(f, "io error: {e}"),
            ModelErr::BadMagic { found, expected } => {
                write!(f, "bad snapshot magic: got {found:#010x}, expected {expected:#010x}")
            }
            ModelErr::BadVersion { found } => {
                write!(f, "unsupported snapshot version {found}")
            }
            ModelErr::TopicCountMismatch { found, expected } => {
                write!(f, "snapshot built for {found} topics, model has {expected}")
            }
            ModelErr::SnapshotKeyOutOfRange { key, bound } => {
                write!(f, "snapshot key {key} out of range, model bound is {bound}")
            }
            ModelErr::SnapshotColumnOutOfRange { key, column, bound } => {
                write!(
                    f,
                    "snapshot record for key {key} names column {column}, model bound is {bound}"
                )
            }
            ModelErr::Table(e) => write!(f, "table service error: {e}"),
        }
    }
}

impl Error for ModelErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelErr::Io(e) => Some(e),
            ModelErr::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TableErr> for ModelErr {
    fn from(value: TableErr) -> Self {
        Self::Table(value)
    }
}

/// Boundary conversion for I/O-shaped adapters.
impl From<ModelErr> for io::Error {
    fn from(value: ModelErr) -> Self {
        match value {
            ModelErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
