use std::ops::Deref;

use crate::{Cell, ShardedTable};

/// A per-worker handle onto one sharded table.
///
/// Minted by a ready `TableService`; each worker holds its own clone and
/// routes reads and delta-adds through it. Dropping a client never tears
/// down the table.
#[derive(Debug)]
pub struct TableClient<C: Cell>(ShardedTable<C>);

impl<C: Cell> Clone for TableClient<C> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<C: Cell> Deref for TableClient<C> {
    type Target = ShardedTable<C>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<C: Cell> TableClient<C> {
    pub(crate) fn new(table: ShardedTable<C>) -> Self {
        Self(table)
    }
}
