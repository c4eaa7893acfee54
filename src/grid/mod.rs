//! Cell grid abstraction over one worksheet.
//!
//! The parsing stages operate on a [`SheetGrid`]: the formatted text of every
//! non-empty cell plus the worksheet's merged-range table. The grid is
//! produced from workbook bytes by the `xlsx` submodule, but the parsing code
//! never touches the workbook format directly, so tests can build grids in
//! memory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub mod xlsx;

/// Zero-based position of a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

impl CellRef {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Inclusive rectangular cell region, e.g. one merged range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }

    /// Single-cell range, used when a cell is not part of any merge.
    pub fn single(row: u32, column: u32) -> Self {
        Self {
            start: CellRef::new(row, column),
            end: CellRef::new(row, column),
        }
    }
}

/// One worksheet as the parser sees it: formatted cell text plus merges.
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    /// Last used cell position (inclusive)
    end: CellRef,
    /// Formatted text of non-empty cells
    cells: HashMap<(u32, u32), String>,
    /// Merged-range table of the sheet
    merges: Vec<CellRange>,
}

impl SheetGrid {
    /// Create an empty grid whose used range ends at `end`.
    pub fn new(end: CellRef) -> Self {
        Self {
            end,
            cells: HashMap::new(),
            merges: Vec::new(),
        }
    }

    /// Decode the first worksheet of an xlsx workbook.
    pub fn from_xlsx_bytes(data: &[u8]) -> Result<Self, ParseError> {
        xlsx::decode(data)
    }

    /// Set the text of a cell, growing the used range if needed.
    pub fn set_text(&mut self, row: u32, column: u32, text: impl Into<String>) {
        self.end.row = self.end.row.max(row);
        self.end.column = self.end.column.max(column);
        self.cells.insert((row, column), text.into());
    }

    /// Register a merged range.
    pub fn add_merge(&mut self, range: CellRange) {
        self.end.row = self.end.row.max(range.end.row);
        self.end.column = self.end.column.max(range.end.column);
        self.merges.push(range);
    }

    /// Text of a cell, or `None` when the cell is absent or blank.
    pub fn text(&self, row: u32, column: u32) -> Option<&str> {
        self.cells
            .get(&(row, column))
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// Last used cell position.
    pub fn end(&self) -> CellRef {
        self.end
    }

    /// The merged range anchored at `(row, column)`, or a 1×1 range when the
    /// cell does not start a merge. Cells *inside* a merge (not at its
    /// top-left corner) also get the 1×1 fallback, mirroring how the
    /// worksheet stores text only at the anchor.
    pub fn merge_from_start(&self, row: u32, column: u32) -> CellRange {
        self.merges
            .iter()
            .copied()
            .find(|range| range.start.row == row && range.start.column == column)
            .unwrap_or_else(|| CellRange::single(row, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_cells_are_absent() {
        let mut grid = SheetGrid::new(CellRef::new(3, 3));
        grid.set_text(1, 1, "  ");
        grid.set_text(2, 2, "ИС-214/23");

        assert_eq!(grid.text(0, 0), None);
        assert_eq!(grid.text(1, 1), None);
        assert_eq!(grid.text(2, 2), Some("ИС-214/23"));
    }

    #[test]
    fn test_merge_lookup_falls_back_to_single_cell() {
        let mut grid = SheetGrid::new(CellRef::new(10, 10));
        grid.add_merge(CellRange::new(CellRef::new(2, 2), CellRef::new(4, 2)));

        assert_eq!(
            grid.merge_from_start(2, 2),
            CellRange::new(CellRef::new(2, 2), CellRef::new(4, 2))
        );
        // inside the merge, but not its anchor
        assert_eq!(grid.merge_from_start(3, 2), CellRange::single(3, 2));
        assert_eq!(grid.merge_from_start(5, 5), CellRange::single(5, 5));
    }

    #[test]
    fn test_set_text_grows_used_range() {
        let mut grid = SheetGrid::new(CellRef::new(0, 0));
        grid.set_text(7, 3, "x");
        assert_eq!(grid.end(), CellRef::new(7, 3));
    }
}
