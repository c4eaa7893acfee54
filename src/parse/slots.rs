//! Time-slot extraction from the time column.
//!
//! Each day band (the rows between one day anchor and the next) carries the
//! day's lesson windows in the time column. A band row whose text contains
//! the slot word "пара" is a numbered slot; anything else with a clock range
//! is an additional period. All groups share one time grid, so extraction
//! runs once per parse and the result is reused for every group column.

use std::ops::Range;

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;
use crate::grid::SheetGrid;
use crate::model::{SlotKind, TimeRange, TimeSlot};

/// `H:MM-H:MM` after whitespace stripping and `.` → `:` normalization.
static CLOCK_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+):(\d+)-(\d+):(\d+)").expect("clock range regex"));

/// Marks a numbered lesson period.
const PAIR_MARKER: &str = "пара";

/// Extract the ordered time slots of one day band.
///
/// `rows` spans from the day anchor row (inclusive) to the next day anchor
/// row, or to the sheet's last row for the final band. Rows without text in
/// the time column are skipped; a row with text but no recognizable clock
/// range fails the parse with [`ParseError::BadTimeRange`].
pub fn extract_day_slots(
    grid: &SheetGrid,
    date: NaiveDate,
    rows: Range<u32>,
    time_column: u32,
) -> Result<Vec<TimeSlot>, ParseError> {
    let mut slots = Vec::new();

    for row in rows {
        let Some(raw) = grid.text(row, time_column) else {
            continue;
        };

        let text: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if text.is_empty() {
            continue;
        }

        let kind = if text.contains(PAIR_MARKER) {
            // "1пара8:30-9:15" after stripping; a marker without a leading
            // digit degrades to an additional period
            match text.chars().next().and_then(|c| c.to_digit(10)) {
                Some(index) => SlotKind::Default { index: index as u8 },
                None => SlotKind::Additional,
            }
        } else {
            SlotKind::Additional
        };

        let normalized = text.replace('.', ":");
        let caps = CLOCK_RANGE
            .captures(&normalized)
            .ok_or_else(|| ParseError::BadTimeRange {
                text: raw.to_string(),
            })?;

        let start = clock_time(&caps[1], &caps[2], raw)?;
        let end = clock_time(&caps[3], &caps[4], raw)?;

        slots.push(TimeSlot {
            time: TimeRange::new(date.and_time(start), date.and_time(end)),
            kind,
            rows: grid.merge_from_start(row, time_column),
        });
    }

    Ok(slots)
}

fn clock_time(hours: &str, minutes: &str, raw: &str) -> Result<NaiveTime, ParseError> {
    let bad = || ParseError::BadTimeRange {
        text: raw.to_string(),
    };

    let hours: u32 = hours.parse().map_err(|_| bad())?;
    let minutes: u32 = minutes.parse().map_err(|_| bad())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(bad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellRange, CellRef};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 6).unwrap()
    }

    #[test]
    fn test_numbered_and_additional_slots() {
        let mut grid = SheetGrid::new(CellRef::new(8, 3));
        grid.set_text(2, 1, "1 пара 8:30-9:15");
        grid.set_text(4, 1, "2 пара 9.25-10.10");
        grid.set_text(6, 1, "Классный час 10:20-10:50");

        let slots = extract_day_slots(&grid, date(), 2..8, 1).unwrap();

        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].kind, SlotKind::Default { index: 1 });
        assert_eq!(
            slots[0].time.start,
            date().and_hms_opt(8, 30, 0).unwrap()
        );
        assert_eq!(slots[1].kind, SlotKind::Default { index: 2 });
        assert_eq!(slots[1].time.end, date().and_hms_opt(10, 10, 0).unwrap());
        assert_eq!(slots[2].kind, SlotKind::Additional);
        assert_eq!(slots[2].default_index(), None);
    }

    #[test]
    fn test_slot_carries_merged_extent() {
        let mut grid = SheetGrid::new(CellRef::new(8, 3));
        grid.set_text(2, 1, "1 пара 8:30-9:15");
        grid.add_merge(CellRange::new(CellRef::new(2, 1), CellRef::new(3, 1)));

        let slots = extract_day_slots(&grid, date(), 2..8, 1).unwrap();
        assert_eq!(slots[0].rows.end.row, 3);
    }

    #[test]
    fn test_missing_clock_range_is_fatal() {
        let mut grid = SheetGrid::new(CellRef::new(4, 3));
        grid.set_text(2, 1, "1 пара");

        assert!(matches!(
            extract_day_slots(&grid, date(), 2..4, 1),
            Err(ParseError::BadTimeRange { .. })
        ));
    }

    #[test]
    fn test_out_of_range_clock_is_fatal() {
        let mut grid = SheetGrid::new(CellRef::new(4, 3));
        grid.set_text(2, 1, "1 пара 25:30-26:15");

        assert!(matches!(
            extract_day_slots(&grid, date(), 2..4, 1),
            Err(ParseError::BadTimeRange { .. })
        ));
    }
}
