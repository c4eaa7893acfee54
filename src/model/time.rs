//! Time windows and time-column slots.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::grid::CellRange;

/// Time window of a lesson or slot, anchored to the day's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }
}

/// What a time-column row band stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// An ordinary numbered lesson period ("пара")
    Default { index: u8 },
    /// A non-numbered extra period
    Additional,
}

/// One row band of the time column: a lesson window plus the merged-cell
/// extent it occupies, used to resolve multi-slot lessons.
#[derive(Debug, Clone)]
pub struct TimeSlot {
    pub time: TimeRange,
    pub kind: SlotKind,
    /// Merged extent of the band in the time column
    pub rows: CellRange,
}

impl TimeSlot {
    /// Slot number for numbered slots, `None` for additional ones.
    pub fn default_index(&self) -> Option<u8> {
        match self.kind {
            SlotKind::Default { index } => Some(index),
            SlotKind::Additional => None,
        }
    }
}
