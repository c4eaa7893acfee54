//! Days and group schedules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lesson::Lesson;

/// One day band of a group's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    /// Day-of-week word from the day anchor, e.g. "Понедельник"
    pub name: String,
    /// Whole-day street override, when the workbook carries one
    pub street: Option<String>,
    pub date: NaiveDate,
    /// Lessons in chronological order, breaks included
    pub lessons: Vec<Lesson>,
}

/// Weekly schedule of one student group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Up to six days, chronological
    pub days: Vec<Day>,
}
