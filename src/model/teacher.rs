//! Teacher schedules, derived from group schedules by inversion.
//!
//! Teacher data is a projection: it is rebuilt from the assembled groups in
//! the same parse pass and never treated as an independent source of truth.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lesson::SubGroup;
use super::time::TimeRange;

/// A group lesson as seen from one teacher's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherLesson {
    /// Name of the group the lesson belongs to
    pub group: String,
    pub name: String,
    pub time: TimeRange,
    pub default_range: (u8, u8),
    pub sub_groups: Vec<SubGroup>,
}

/// One day of a teacher's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherDay {
    pub name: String,
    pub date: NaiveDate,
    /// Lessons sorted by start time
    pub lessons: Vec<TeacherLesson>,
}

/// Weekly schedule of one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    /// Days sorted by date; only days with lessons are present
    pub days: Vec<TeacherDay>,
}
