//! Parsing stages: skeleton discovery, time-slot extraction, cell
//! segmentation and schedule assembly.
//!
//! The stages run in a fixed order over one [`SheetGrid`](crate::grid::SheetGrid):
//! the skeleton scanner locates day rows and group columns, the slot
//! extractor derives each day band's time windows once, the segmenter turns
//! individual cells into lessons, and the assembler composes per-group days
//! and inverts them into teacher schedules.

mod assemble;
mod segment;
mod skeleton;
mod slots;

pub use assemble::{assemble_groups, derive_teachers};
pub use segment::{CellOutcome, segment_cell, split_name_and_teachers};
pub use skeleton::{Anchor, Skeleton, scan_skeleton};
pub use slots::extract_day_slots;

/// Collapse every whitespace run to a single space and trim the ends.
pub(crate) fn trim_all(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
