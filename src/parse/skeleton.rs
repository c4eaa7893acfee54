//! Skeleton discovery: day anchors and group anchors.
//!
//! The first grid column carries the day anchors (`<day word> dd.mm.yy`); the
//! group header row sits directly above the first non-empty cell of that
//! column, with group names from the third column onward. Scanning covers one
//! work-week: a second "Суббота" anchor is the trailing boundary row and
//! terminates the walk.

use once_cell::sync::Lazy;
use regex::Regex;

use super::trim_all;
use crate::error::ParseError;
use crate::grid::SheetGrid;

/// `<cyrillic word> <digits.digits.digits>` after whitespace normalization.
static DAY_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[А-Яа-я]+\s\d+\.\d+\.\d+").expect("day anchor regex"));

const SATURDAY_PREFIX: &str = "Суббота";

/// Column index of the first group column; columns 0 and 1 hold day anchors
/// and slot times.
const FIRST_GROUP_COLUMN: u32 = 2;

/// A located skeleton marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub row: u32,
    pub column: u32,
    pub text: String,
}

/// Day rows and group columns of one worksheet.
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// Day anchors in top-to-bottom order, at most one work-week
    pub days: Vec<Anchor>,
    /// Group anchors in left-to-right order
    pub groups: Vec<Anchor>,
}

/// Locate day and group anchors.
///
/// Fails with [`ParseError::NoDayAnchors`] when the first column holds no
/// day anchor at all, which means the workbook does not follow the layout
/// convention.
pub fn scan_skeleton(grid: &SheetGrid) -> Result<Skeleton, ParseError> {
    let end = grid.end();

    let mut days = Vec::new();
    let mut groups = Vec::new();
    let mut header_parsed = false;
    let mut saturdays_seen = 0u8;

    for row in 1..=end.row {
        let Some(text) = grid.text(row, 0) else {
            continue;
        };

        // The group header row sits directly above the first non-empty cell
        // of the day column; it is parsed exactly once, lazily.
        if !header_parsed {
            header_parsed = true;
            for column in FIRST_GROUP_COLUMN..=end.column {
                if let Some(name) = grid.text(row - 1, column) {
                    groups.push(Anchor {
                        row: row - 1,
                        column,
                        text: trim_all(name),
                    });
                }
            }
        }

        let normalized = trim_all(text);
        if !DAY_ANCHOR.is_match(&normalized) {
            continue;
        }

        if normalized.starts_with(SATURDAY_PREFIX) {
            saturdays_seen += 1;
            if saturdays_seen == 2 {
                // trailing boundary row of the week, not a day
                break;
            }
        }

        days.push(Anchor {
            row,
            column: 0,
            text: normalized,
        });
    }

    if days.is_empty() {
        return Err(ParseError::NoDayAnchors);
    }

    log::debug!(
        "skeleton: {} day anchor(s), {} group anchor(s)",
        days.len(),
        groups.len()
    );

    Ok(Skeleton { days, groups })
}
