//! Workbook decoding via calamine.
//!
//! Only the first worksheet is read: the timetable convention puts the whole
//! week on one sheet. Merged regions are loaded eagerly because lesson and
//! slot spans are derived from them.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use super::{CellRange, CellRef, SheetGrid};
use crate::error::ParseError;

/// Decode the first worksheet of an xlsx workbook into a [`SheetGrid`].
pub(crate) fn decode(data: &[u8]) -> Result<SheetGrid, ParseError> {
    let mut workbook = Xlsx::new(Cursor::new(data))?;
    workbook.load_merged_regions()?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoWorksheet)?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let merges = workbook
        .worksheet_merge_cells(&sheet_name)
        .unwrap_or(Ok(Vec::new()))
        .unwrap_or_default();

    let start = range.start().unwrap_or((0, 0));
    let end = range.end().unwrap_or((0, 0));

    let mut grid = SheetGrid::new(CellRef::new(end.0, end.1));

    for (r, row) in range.rows().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let text = cell_text(value);
            if !text.is_empty() {
                grid.set_text(start.0 + r as u32, start.1 + c as u32, text);
            }
        }
    }

    for dims in merges {
        grid.add_merge(CellRange::new(
            CellRef::new(dims.start.0, dims.start.1),
            CellRef::new(dims.end.0, dims.end.1),
        ));
    }

    Ok(grid)
}

/// Formatted text of a cell value, `""` for empty and error cells.
fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_formats_numbers_without_trailing_zeroes() {
        assert_eq!(cell_text(&Data::Float(101.0)), "101");
        assert_eq!(cell_text(&Data::Float(8.5)), "8.5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
