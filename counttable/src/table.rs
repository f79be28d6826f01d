use rayon::prelude::*;

use crate::{Cell, Row};

/// Contiguous storage mapping keys in `[0, keys)` to fixed-width rows.
///
/// Row lookup is O(1). The key range and row width are fixed at
/// construction, so a `&Row` stays valid for the table's whole life.
#[derive(Debug)]
pub struct CountTable<C: Cell> {
    rows: Box<[Row<C>]>,
    cols: usize,
}

impl<C: Cell> CountTable<C> {
    /// Allocates a zero-filled table of `keys` rows by `cols` columns.
    pub fn zeroed(keys: usize, cols: usize) -> Self {
        let rows = (0..keys).map(|_| Row::zeroed(cols)).collect();
        Self { rows, cols }
    }

    pub fn keys(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the row for `key`.
    ///
    /// # Panics
    /// If `key` is outside `[0, keys)`. Callers are expected to pass ids
    /// validated at corpus-load time; a bad key is a caller bug.
    pub fn row(&self, key: usize) -> &Row<C> {
        assert!(
            key < self.rows.len(),
            "key {key} out of range for table with {} rows",
            self.rows.len(),
        );
        &self.rows[key]
    }

    /// Applies `delta` to the counter at (`key`, `col`).
    pub fn add(&self, key: usize, col: usize, delta: C) {
        self.row(key).add(col, delta);
    }

    /// Sums one column over every row, widened to `i64`.
    ///
    /// Meant for quiescent invariant checks; a concurrent writer makes the
    /// result a momentary snapshot, not an exact total.
    pub fn column_total(&self, col: usize) -> i64 {
        self.rows
            .par_iter()
            .map(|row| row.get(col).widen())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_dimensions() {
        let table = CountTable::<i32>::zeroed(5, 3);

        assert_eq!(table.keys(), 5);
        assert_eq!(table.cols(), 3);
        assert!(table.row(4).iter().all(|c| c == 0));
    }

    #[test]
    fn test_add_accumulates_per_key() {
        let table = CountTable::<i32>::zeroed(3, 2);

        table.add(0, 0, 1);
        table.add(0, 0, 2);
        table.add(2, 1, 5);

        assert_eq!(table.row(0).get(0), 3);
        assert_eq!(table.row(2).get(1), 5);
        assert_eq!(table.row(1).to_vec(), [0, 0]);
    }

    #[test]
    fn test_column_total_sums_all_rows() {
        let table = CountTable::<i32>::zeroed(100, 2);

        for key in 0..100 {
            table.add(key, 1, 2);
        }

        assert_eq!(table.column_total(1), 200);
        assert_eq!(table.column_total(0), 0);
    }

    #[test]
    #[should_panic(expected = "key 3 out of range")]
    fn test_key_out_of_range_panics() {
        let table = CountTable::<i32>::zeroed(3, 2);
        table.row(3);
    }
}
