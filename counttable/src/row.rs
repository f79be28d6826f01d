use crate::Cell;

/// A fixed-width row of atomic counters.
///
/// Concurrent `add` calls on the same column never lose updates. A `get`
/// racing an `add` observes either the old or the new value.
#[derive(Debug)]
pub struct Row<C: Cell> {
    cells: Box<[C::Atomic]>,
}

impl<C: Cell> Row<C> {
    pub(crate) fn zeroed(width: usize) -> Self {
        let cells = (0..width).map(|_| C::atomic(C::default())).collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reads the counter at `col`.
    ///
    /// # Panics
    /// If `col` is outside the row width. Out-of-range columns are a caller
    /// bug, not a runtime condition.
    pub fn get(&self, col: usize) -> C {
        let cell = self.cell(col);
        C::load(cell)
    }

    /// Applies `delta` to the counter at `col`.
    ///
    /// # Panics
    /// If `col` is outside the row width.
    pub fn add(&self, col: usize, delta: C) {
        let cell = self.cell(col);
        C::fetch_add(cell, delta);
    }

    pub(crate) fn set(&self, col: usize, value: C) {
        let cell = self.cell(col);
        C::store(cell, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = C> + '_ {
        self.cells.iter().map(C::load)
    }

    pub fn to_vec(&self) -> Vec<C> {
        self.iter().collect()
    }

    fn cell(&self, col: usize) -> &C::Atomic {
        assert!(
            col < self.cells.len(),
            "column {col} out of range for row of width {}",
            self.cells.len(),
        );
        &self.cells[col]
    }
}
