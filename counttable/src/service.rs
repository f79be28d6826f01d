use std::{marker::PhantomData, num::NonZeroUsize};

use log::{debug, info};

use crate::{Cell, Result, RowSource, ShardedTable, TableClient, TableErr};

/// Typed handle to one declared table. Only valid against the service
/// whose builder minted it.
#[derive(Debug)]
pub struct TableId<C: Cell> {
    index: usize,
    _cell: PhantomData<fn() -> C>,
}

impl<C: Cell> Clone for TableId<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Cell> Copy for TableId<C> {}

/// Per-table placement options, set during the configure step.
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    /// Number of shards the key range is partitioned over.
    pub shards: NonZeroUsize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            shards: NonZeroUsize::MIN,
        }
    }
}

#[doc(hidden)]
#[derive(Debug)]
pub enum AnyTable {
    I32(ShardedTable<i32>),
    I64(ShardedTable<i64>),
}

struct Declared {
    name: String,
    keys: usize,
    cols: usize,
    options: TableOptions,
    build: fn(usize, usize, NonZeroUsize) -> AnyTable,
}

fn build_table<C: Cell>(keys: usize, cols: usize, shards: NonZeroUsize) -> AnyTable {
    C::into_any(ShardedTable::zeroed(keys, cols, shards))
}

/// Collects table declarations and options before any storage exists.
///
/// The lifecycle is declare -> configure -> build; `build` consumes the
/// builder and allocates every table, so a ready `TableService` can never
/// be re-initialized and no table can be touched before it exists.
pub struct ServiceBuilder {
    declared: Vec<Declared>,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self { declared: Vec::new() }
    }

    /// Declares a table of `keys` rows by `cols` columns of `C` counters.
    ///
    /// # Errors
    /// `TableErr::DuplicateTable` if `name` was already declared.
    pub fn declare<C: Cell>(&mut self, name: &str, keys: usize, cols: usize) -> Result<TableId<C>> {
        if self.declared.iter().any(|d| d.name == name) {
            return Err(TableErr::DuplicateTable { name: name.to_string() });
        }

        debug!(keys = keys, cols = cols, width = C::NAME; "declared table `{name}`");
        self.declared.push(Declared {
            name: name.to_string(),
            keys,
            cols,
            options: TableOptions::default(),
            build: build_table::<C>,
        });

        Ok(TableId {
            index: self.declared.len() - 1,
            _cell: PhantomData,
        })
    }

    /// Sets placement options for a declared table. Unconfigured tables
    /// keep the defaults.
    pub fn configure<C: Cell>(&mut self, id: TableId<C>, options: TableOptions) {
        self.entry(id.index).options = options;
    }

    /// Allocates every declared table and transitions to the ready state.
    pub fn build(self) -> TableService {
        let tables = self
            .declared
            .into_iter()
            .map(|d| {
                debug!(keys = d.keys, cols = d.cols, shards = d.options.shards.get();
                    "building table `{}`", d.name);
                let table = (d.build)(d.keys, d.cols, d.options.shards);
                ServiceTable { name: d.name, table }
            })
            .collect();

        TableService { tables }
    }

    fn entry(&mut self, index: usize) -> &mut Declared {
        assert!(index < self.declared.len(), "unknown table id {index}");
        &mut self.declared[index]
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct ServiceTable {
    name: String,
    table: AnyTable,
}

/// The ready table service: every declared table allocated and zeroed.
///
/// Bulk loads run before workers are minted clients; that ordering is the
/// caller's barrier, this type only guarantees the tables exist.
#[derive(Debug)]
pub struct TableService {
    tables: Vec<ServiceTable>,
}

impl TableService {
    /// Streams `source` into the table, once, key by key.
    ///
    /// Returns the number of rows consumed.
    ///
    /// # Errors
    /// I/O failures from the source, or range/width violations in its
    /// content. A failed load leaves the table partially written; callers
    /// abort startup rather than serve from it.
    pub fn bulk_load<C: Cell>(&self, id: TableId<C>, source: &mut dyn RowSource) -> Result<u64> {
        let entry = self.entry(id.index);
        let table = resolve::<C>(entry);
        let mut rows = 0u64;

        while let Some(row) = source.next_row()? {
            if row.key >= table.keys() {
                return Err(TableErr::LoadKeyOutOfRange {
                    table: entry.name.clone(),
                    key: row.key,
                    keys: table.keys(),
                });
            }

            let target = table.row(row.key);
            for &(col, value) in &row.entries {
                if col >= table.cols() {
                    return Err(TableErr::LoadColumnOutOfRange {
                        table: entry.name.clone(),
                        key: row.key,
                        col,
                        cols: table.cols(),
                    });
                }
                let value = C::from_wide(value).ok_or_else(|| TableErr::LoadValueOverflow {
                    table: entry.name.clone(),
                    key: row.key,
                    col,
                    value,
                })?;
                target.set(col, value);
            }
            rows += 1;
        }

        info!(rows = rows; "bulk-loaded table `{}`", entry.name);
        Ok(rows)
    }

    /// Mints a per-worker client for one table.
    ///
    /// # Panics
    /// If `id` was minted by a different service or with a different
    /// counter width; both are caller bugs.
    pub fn client<C: Cell>(&self, id: TableId<C>) -> TableClient<C> {
        let entry = self.entry(id.index);
        let table = resolve::<C>(entry);
        TableClient::new(table.clone())
    }

    fn entry(&self, index: usize) -> &ServiceTable {
        assert!(index < self.tables.len(), "unknown table id {index}");
        &self.tables[index]
    }
}

fn resolve<C: Cell>(entry: &ServiceTable) -> &ShardedTable<C> {
    match C::from_any(&entry.table) {
        Some(table) => table,
        None => panic!("table `{}` does not hold {} counters", entry.name, C::NAME),
    }
}
