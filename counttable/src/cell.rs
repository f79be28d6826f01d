use std::{
    fmt::Debug,
    sync::atomic::{AtomicI32, AtomicI64, Ordering},
};

use crate::{AnyTable, ShardedTable};

/// A counter value type together with its atomic storage cell.
///
/// All accesses are relaxed: delta-adds commute, so no ordering between
/// writers is needed, and readers tolerate momentarily interleaved values.
/// Thread joins (or any other external synchronization) are what make the
/// final totals visible.
pub trait Cell: Copy + Default + Send + Sync + 'static {
    type Atomic: Send + Sync + Debug;

    /// Width label used in diagnostics.
    const NAME: &'static str;

    fn atomic(value: Self) -> Self::Atomic;
    fn load(cell: &Self::Atomic) -> Self;
    fn store(cell: &Self::Atomic, value: Self);
    fn fetch_add(cell: &Self::Atomic, delta: Self) -> Self;

    /// Narrows a wide load value, `None` if it doesn't fit.
    fn from_wide(value: i64) -> Option<Self>;
    fn widen(self) -> i64;

    #[doc(hidden)]
    fn into_any(table: ShardedTable<Self>) -> AnyTable;
    #[doc(hidden)]
    fn from_any(table: &AnyTable) -> Option<&ShardedTable<Self>>;
}

impl Cell for i32 {
    type Atomic = AtomicI32;

    const NAME: &'static str = "i32";

    fn atomic(value: Self) -> Self::Atomic {
        AtomicI32::new(value)
    }

    fn load(cell: &Self::Atomic) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn store(cell: &Self::Atomic, value: Self) {
        cell.store(value, Ordering::Relaxed);
    }

    fn fetch_add(cell: &Self::Atomic, delta: Self) -> Self {
        cell.fetch_add(delta, Ordering::Relaxed)
    }

    fn from_wide(value: i64) -> Option<Self> {
        i32::try_from(value).ok()
    }

    fn widen(self) -> i64 {
        i64::from(self)
    }

    fn into_any(table: ShardedTable<Self>) -> AnyTable {
        AnyTable::I32(table)
    }

    fn from_any(table: &AnyTable) -> Option<&ShardedTable<Self>> {
        match table {
            AnyTable::I32(table) => Some(table),
            AnyTable::I64(_) => None,
        }
    }
}

impl Cell for i64 {
    type Atomic = AtomicI64;

    const NAME: &'static str = "i64";

    fn atomic(value: Self) -> Self::Atomic {
        AtomicI64::new(value)
    }

    fn load(cell: &Self::Atomic) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn store(cell: &Self::Atomic, value: Self) {
        cell.store(value, Ordering::Relaxed);
    }

    fn fetch_add(cell: &Self::Atomic, delta: Self) -> Self {
        cell.fetch_add(delta, Ordering::Relaxed)
    }

    fn from_wide(value: i64) -> Option<Self> {
        Some(value)
    }

    fn widen(self) -> i64 {
        self
    }

    fn into_any(table: ShardedTable<Self>) -> AnyTable {
        AnyTable::I64(table)
    }

    fn from_any(table: &AnyTable) -> Option<&ShardedTable<Self>> {
        match table {
            AnyTable::I64(table) => Some(table),
            AnyTable::I32(_) => None,
        }
    }
}
