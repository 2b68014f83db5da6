use std::collections::HashSet;

use crate::GridCell;

/// Cells captured so far in the session. Only grows until the engine resets.
#[derive(Clone, Debug, Default)]
pub struct CoveredSet {
    cells: HashSet<GridCell>,
}

impl CoveredSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, cell: &GridCell) -> bool {
        self.cells.contains(cell)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Add cells; returns how many were not yet present.
    pub(crate) fn extend<'a>(&mut self, cells: impl IntoIterator<Item = &'a GridCell>) -> usize {
        let before = self.cells.len();
        self.cells.extend(cells.into_iter().copied());
        self.cells.len() - before
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }
}
