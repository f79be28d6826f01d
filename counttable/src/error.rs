use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The table service's result type.
pub type Result<T> = std::result::Result<T, TableErr>;

/// Failures raised while declaring or bulk-loading tables.
///
/// Steady-state reads and delta-adds never produce these: out-of-range
/// keys there are caller bugs and panic instead.
#[derive(Debug)]
pub enum TableErr {
    DuplicateTable {
        name: String,
    },
    LoadKeyOutOfRange {
        table: String,
        key: usize,
        keys: usize,
    },
    LoadColumnOutOfRange {
        table: String,
        key: usize,
        col: usize,
        cols: usize,
    },
    LoadValueOverflow {
        table: String,
        key: usize,
        col: usize,
        value: i64,
    },
    Io(io::Error),
}

impl Display for TableErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableErr::DuplicateTable { name } => {
                write!(f, "table `{name}` declared twice")
            }
            TableErr::LoadKeyOutOfRange { table, key, keys } => {
                write!(f, "load into `{table}`: key {key} out of range, table has {keys} rows")
            }
            TableErr::LoadColumnOutOfRange { table, key, col, cols } => {
                write!(
                    f,
                    "load into `{table}` at key {key}: column {col} out of range, rows have {cols} columns"
                )
            }
            TableErr::LoadValueOverflow { table, key, col, value } => {
                write!(
                    f,
                    "load into `{table}` at ({key}, {col}): value {value} does not fit the counter width"
                )
            }
            TableErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for TableErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TableErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TableErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
