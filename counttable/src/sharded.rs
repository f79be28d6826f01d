use std::{num::NonZeroUsize, sync::Arc};

use rayon::prelude::*;

use crate::{Cell, CountTable, Row};

/// A table whose keys are partitioned modulo `shards` across per-shard
/// storage.
///
/// Shard `s` owns every key `k` with `k % shards == s`, at local index
/// `k / shards`. Clones share the underlying shards, so a clone is a
/// cheap per-worker view onto the same logical table.
#[derive(Debug)]
pub struct ShardedTable<C: Cell> {
    shards: Arc<[CountTable<C>]>,
    keys: usize,
    cols: usize,
}

impl<C: Cell> Clone for ShardedTable<C> {
    fn clone(&self) -> Self {
        Self {
            shards: Arc::clone(&self.shards),
            keys: self.keys,
            cols: self.cols,
        }
    }
}

impl<C: Cell> ShardedTable<C> {
    /// Allocates a zero-filled table of `keys` rows split across `shards`.
    pub fn zeroed(keys: usize, cols: usize, shards: NonZeroUsize) -> Self {
        let num = shards.get();
        let shards: Vec<_> = (0..num)
            .into_par_iter()
            .map(|shard| CountTable::zeroed(shard_keys(keys, num, shard), cols))
            .collect();

        Self {
            shards: Arc::from(shards),
            keys,
            cols,
        }
    }

    pub fn keys(&self) -> usize {
        self.keys
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Resolves `key` to its shard and returns the row.
    ///
    /// # Panics
    /// If `key` is outside `[0, keys)`.
    pub fn row(&self, key: usize) -> &Row<C> {
        assert!(
            key < self.keys,
            "key {key} out of range for table with {} rows",
            self.keys,
        );
        let num = self.shards.len();
        self.shards[key % num].row(key / num)
    }

    /// Applies `delta` to the counter at (`key`, `col`) on the owning shard.
    pub fn add(&self, key: usize, col: usize, delta: C) {
        self.row(key).add(col, delta);
    }

    /// Sums one column over every shard, widened to `i64`.
    pub fn column_total(&self, col: usize) -> i64 {
        self.shards
            .iter()
            .map(|shard| shard.column_total(col))
            .sum()
    }
}

fn shard_keys(keys: usize, shards: usize, shard: usize) -> usize {
    keys / shards + usize::from(shard < keys % shards)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_shard_sizes_cover_all_keys() {
        let table = ShardedTable::<i32>::zeroed(10, 1, nz(3));

        // 10 keys over 3 shards: shard 0 gets keys 0,3,6,9.
        assert_eq!(table.num_shards(), 3);
        let total: usize = (0..3).map(|s| shard_keys(10, 3, s)).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_every_key_routes_to_exactly_one_row() {
        let table = ShardedTable::<i32>::zeroed(17, 1, nz(4));

        for key in 0..17 {
            table.add(key, 0, 1);
        }

        for key in 0..17 {
            assert_eq!(table.row(key).get(0), 1, "key {key}");
        }
        assert_eq!(table.column_total(0), 17);
    }

    #[test]
    fn test_clones_share_storage() {
        let table = ShardedTable::<i64>::zeroed(4, 2, nz(2));
        let view = table.clone();

        view.add(3, 1, 9);

        assert_eq!(table.row(3).get(1), 9);
    }

    #[test]
    fn test_concurrent_adds_across_clones() {
        const THREADS: usize = 4;
        const ADDS: usize = 500;

        let table = ShardedTable::<i32>::zeroed(8, 1, nz(3));

        thread::scope(|s| {
            for _ in 0..THREADS {
                let view = table.clone();
                s.spawn(move || {
                    for key in 0..ADDS {
                        view.add(key % 8, 0, 1);
                    }
                });
            }
        });

        assert_eq!(table.column_total(0), (THREADS * ADDS) as i64);
    }

    #[test]
    #[should_panic(expected = "key 5 out of range")]
    fn test_key_out_of_range_panics_before_routing() {
        let table = ShardedTable::<i32>::zeroed(5, 1, nz(2));
        table.row(5);
    }
}
