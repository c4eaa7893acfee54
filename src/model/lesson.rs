//! Lessons and subgroups.
//!
//! `Lesson` is a tagged union with one variant per kind: only `Default`
//! lessons carry a slot range and subgroups, only `Break` lessons are
//! nameless. Consumers that need the raw classification use [`LessonKind`].

use serde::{Deserialize, Serialize};

use super::time::TimeRange;

/// Cabinet marker used when a lesson has subgroups but the cabinet column is
/// empty.
pub const UNKNOWN_CABINET: &str = "??";

/// Teacher string of subgroups fabricated when a cell names more cabinets
/// than subgroups. A data-quality signal from the source workbook, kept in
/// the model for compatibility with existing consumers.
pub const SCHEDULE_ERROR_TEACHER: &str = "Ошибка в расписании";

/// Sentinel teacher of lessons that belong to another group's schedule.
pub(crate) const FOREIGN_GROUP_TEACHER: &str = "Только у другой";

/// One parallel teacher/cabinet assignment within a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGroup {
    /// Subgroup number, 1-based after backfilling
    pub number: u8,
    pub cabinet: Option<String>,
    /// Display form "Фамилия И.О."
    pub teacher: String,
}

/// Classification of a lesson, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonKind {
    Default,
    Break,
    Exam,
    ExamWithGrade,
    ExamDefault,
    Consultation,
    IndependentWork,
    Additional,
}

/// One scheduled (or synthetic) lesson of a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lesson {
    /// An ordinary lesson occupying one or more numbered slots
    Default {
        name: String,
        time: TimeRange,
        /// First and last occupied slot number, inclusive
        default_range: (u8, u8),
        sub_groups: Vec<SubGroup>,
    },
    /// Synthetic pause between two non-adjacent lessons
    Break { time: TimeRange },
    /// "ЗАЧЕТ"
    Exam { name: String, time: TimeRange },
    /// "ЗАЧЕТ С ОЦЕНКОЙ"
    ExamWithGrade { name: String, time: TimeRange },
    /// "ЭКЗАМЕН"
    ExamDefault { name: String, time: TimeRange },
    Consultation { name: String, time: TimeRange },
    IndependentWork { name: String, time: TimeRange },
    /// A lesson in a non-numbered slot
    Additional { name: String, time: TimeRange },
}

impl Lesson {
    pub fn kind(&self) -> LessonKind {
        match self {
            Lesson::Default { .. } => LessonKind::Default,
            Lesson::Break { .. } => LessonKind::Break,
            Lesson::Exam { .. } => LessonKind::Exam,
            Lesson::ExamWithGrade { .. } => LessonKind::ExamWithGrade,
            Lesson::ExamDefault { .. } => LessonKind::ExamDefault,
            Lesson::Consultation { .. } => LessonKind::Consultation,
            Lesson::IndependentWork { .. } => LessonKind::IndependentWork,
            Lesson::Additional { .. } => LessonKind::Additional,
        }
    }

    pub fn time(&self) -> TimeRange {
        match self {
            Lesson::Default { time, .. }
            | Lesson::Break { time }
            | Lesson::Exam { time, .. }
            | Lesson::ExamWithGrade { time, .. }
            | Lesson::ExamDefault { time, .. }
            | Lesson::Consultation { time, .. }
            | Lesson::IndependentWork { time, .. }
            | Lesson::Additional { time, .. } => *time,
        }
    }

    /// Lesson name; `None` for breaks.
    pub fn name(&self) -> Option<&str> {
        match self {
            Lesson::Break { .. } => None,
            Lesson::Default { name, .. }
            | Lesson::Exam { name, .. }
            | Lesson::ExamWithGrade { name, .. }
            | Lesson::ExamDefault { name, .. }
            | Lesson::Consultation { name, .. }
            | Lesson::IndependentWork { name, .. }
            | Lesson::Additional { name, .. } => Some(name),
        }
    }

    /// Subgroups; `None` for every kind except `Default`.
    pub fn sub_groups(&self) -> Option<&[SubGroup]> {
        match self {
            Lesson::Default { sub_groups, .. } => Some(sub_groups),
            _ => None,
        }
    }

    /// Occupied slot-number range; `None` for every kind except `Default`.
    pub fn default_range(&self) -> Option<(u8, u8)> {
        match self {
            Lesson::Default { default_range, .. } => Some(*default_range),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> TimeRange {
        let date = NaiveDate::from_ymd_opt(2024, 10, 6).unwrap();
        TimeRange::new(
            date.and_hms_opt(8, 30, 0).unwrap(),
            date.and_hms_opt(9, 15, 0).unwrap(),
        )
    }

    #[test]
    fn test_kind_dependent_accessors() {
        let lesson = Lesson::ExamWithGrade {
            name: String::new(),
            time: range(),
        };
        assert_eq!(lesson.kind(), LessonKind::ExamWithGrade);
        assert_eq!(lesson.name(), Some(""));
        assert_eq!(lesson.sub_groups(), None);
        assert_eq!(lesson.default_range(), None);

        let pause = Lesson::Break { time: range() };
        assert_eq!(pause.name(), None);
    }

    #[test]
    fn test_serialized_kind_tag() {
        let lesson = Lesson::Break { time: range() };
        let json = serde_json::to_value(&lesson).unwrap();
        assert_eq!(json["kind"], "BREAK");
    }
}
