//! Cell segmentation: raw cell text into lesson records.
//!
//! A group/slot cell is either a whole-day street override, or one lesson
//! whose kind, name, time span, subgroups and cabinets are recovered from the
//! cell text, the merged-range table and the adjacent cabinet column. The
//! name/teacher split is the most failure-prone heuristic in the system, so
//! it lives in [`split_name_and_teachers`] as a pure function with its own
//! tests.

use once_cell::sync::Lazy;
use regex::Regex;

use super::trim_all;
use crate::error::ParseError;
use crate::grid::SheetGrid;
use crate::model::{
    Lesson, LessonKind, SCHEDULE_ERROR_TEACHER, SlotKind, SubGroup, TimeRange, TimeSlot,
    UNKNOWN_CABINET,
};

/// A standalone "Street, number" cell overrides the day's street.
static STREET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-Я][а-я]+,?\s?[0-9]+$").expect("street regex"));

/// One-or-more teacher tokens anchored at the end of the de-spaced text.
static TEACHER_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[А-Я][а-я]+[А-Я]{2}(?:\([0-9][а-я]+\))?)+$").expect("teacher run regex")
});

/// `Surname` + two capital initials + optional `(N<suffix>)` subgroup tag.
static TEACHER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([А-Я][а-я]+)([А-Я])([А-Я])(?:\(([0-9])[а-я]+\))?").expect("teacher token regex")
});

/// Consultation without the parenthesized form, either capitalization.
static CONSULTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?[кК]онсультация\)?").expect("consultation regex"));

const KW_EXAM_WITH_GRADE: &str = "ЗАЧЕТ С ОЦЕНКОЙ";
const KW_EXAM: &str = "ЗАЧЕТ";
const KW_EXAM_DEFAULT: &str = "ЭКЗАМЕН";
const KW_CONSULTATION_PAREN: &str = "(консультация)";
const KW_INDEPENDENT_WORK: &str = "САМОСТОЯТЕЛЬНАЯ РАБОТА";

/// What one group/slot cell contributed to the day.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    /// The cell held a street override for the whole day, not a lesson
    Street(String),
    /// Lessons to append: empty, one lesson, or a bridging break plus lesson
    Lessons(Vec<Lesson>),
}

/// Segment the cell at (`slot` row, `column`) into lessons.
///
/// `day_slots` is the full slot list of the day, used to resolve the end of
/// lessons spanning several slots through their merged range. `previous` is
/// the last lesson already appended to the day, used for gap bridging.
pub fn segment_cell(
    grid: &SheetGrid,
    day_slots: &[TimeSlot],
    slot: &TimeSlot,
    column: u32,
    previous: Option<&Lesson>,
) -> Result<CellOutcome, ParseError> {
    let row = slot.rows.start.row;

    let raw = match grid.text(row, column) {
        Some(text) => trim_all(&text.replace(['\n', '\r'], " ")),
        None => return Ok(CellOutcome::Lessons(Vec::new())),
    };
    if raw.is_empty() {
        return Ok(CellOutcome::Lessons(Vec::new()));
    }

    if STREET.is_match(&raw) {
        return Ok(CellOutcome::Street(raw));
    }

    let (kind, rest) = classify(&raw, slot.kind);

    // A lesson merged over several slot rows ends at the slot whose merged
    // extent ends on the same row as this cell's merge.
    let merge = grid.merge_from_start(row, column);
    let end_slot = day_slots
        .iter()
        .find(|candidate| candidate.rows.end.row == merge.end.row);

    let time = TimeRange::new(
        slot.time.start,
        end_slot.map(|s| s.time.end).unwrap_or(slot.time.end),
    );

    let (name, sub_groups) = split_name_and_teachers(&rest);

    let lesson = match kind {
        LessonKind::Default => {
            let index = match slot.kind {
                SlotKind::Default { index } => index,
                // a default lesson only ever comes from a numbered slot
                SlotKind::Additional => 0,
            };
            let default_range = (
                index,
                end_slot.and_then(TimeSlot::default_index).unwrap_or(index),
            );

            let mut sub_groups = sub_groups;
            resolve_cabinets(grid, row, column + 1, &mut sub_groups)?;

            Lesson::Default {
                name,
                time,
                default_range,
                sub_groups,
            }
        }
        LessonKind::Exam => Lesson::Exam { name, time },
        LessonKind::ExamWithGrade => Lesson::ExamWithGrade { name, time },
        LessonKind::ExamDefault => Lesson::ExamDefault { name, time },
        LessonKind::Consultation => Lesson::Consultation { name, time },
        LessonKind::IndependentWork => Lesson::IndependentWork { name, time },
        LessonKind::Additional => Lesson::Additional { name, time },
        // never produced by classification
        LessonKind::Break => return Ok(CellOutcome::Lessons(Vec::new())),
    };

    let mut lessons = Vec::with_capacity(2);
    if let Some(previous) = previous {
        let gap_start = previous.time().end;
        if gap_start != time.start {
            lessons.push(Lesson::Break {
                time: TimeRange::new(gap_start, time.start),
            });
        }
    }
    lessons.push(lesson);

    Ok(CellOutcome::Lessons(lessons))
}

/// Classify the cell by keyword precedence, stripping the matched keyword.
fn classify(text: &str, slot_kind: SlotKind) -> (LessonKind, String) {
    if text.contains(KW_EXAM_WITH_GRADE) {
        (
            LessonKind::ExamWithGrade,
            trim_all(&text.replacen(KW_EXAM_WITH_GRADE, "", 1)),
        )
    } else if text.contains(KW_EXAM) {
        (LessonKind::Exam, trim_all(&text.replacen(KW_EXAM, "", 1)))
    } else if text.contains(KW_EXAM_DEFAULT) {
        (
            LessonKind::ExamDefault,
            trim_all(&text.replacen(KW_EXAM_DEFAULT, "", 1)),
        )
    } else if text.contains(KW_CONSULTATION_PAREN) {
        (
            LessonKind::Consultation,
            trim_all(&text.replacen(KW_CONSULTATION_PAREN, "", 1)),
        )
    } else if CONSULTATION.is_match(text) {
        (
            LessonKind::Consultation,
            trim_all(&CONSULTATION.replace(text, "")),
        )
    } else if text.contains(KW_INDEPENDENT_WORK) {
        (
            LessonKind::IndependentWork,
            trim_all(&text.replacen(KW_INDEPENDENT_WORK, "", 1)),
        )
    } else {
        let kind = match slot_kind {
            SlotKind::Default { .. } => LessonKind::Default,
            SlotKind::Additional => LessonKind::Additional,
        };
        (kind, text.to_string())
    }
}

/// Split normalized cell text into a lesson title and its teacher subgroups.
///
/// Teacher tokens (`Фамилия` + two initials, optionally `(1п)`-tagged) are
/// matched as a run anchored at the end of the text with all whitespace and
/// punctuation removed; everything before the first token is the title. When
/// no token matches, the whole text is the title and no subgroups are
/// produced. Subgroup numbers are backfilled so that one subgroup is number
/// 1 and a pair without explicit tags becomes 1 and 2.
pub fn split_name_and_teachers(text: &str) -> (String, Vec<SubGroup>) {
    if text.is_empty() {
        return (String::new(), Vec::new());
    }

    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.' && *c != ',')
        .collect();

    let Some(run) = TEACHER_RUN.find(&compact) else {
        return (clean_name(text), Vec::new());
    };

    let mut name = None;
    let mut sub_groups = Vec::new();

    for caps in TEACHER_TOKEN.captures_iter(run.as_str()) {
        let surname = &caps[1];

        if name.is_none() {
            let cut = text.find(surname).unwrap_or(0);
            name = Some(clean_name(&text[..cut]));
        }

        let number = caps
            .get(4)
            .and_then(|tag| tag.as_str().parse::<u8>().ok())
            .unwrap_or(0);

        sub_groups.push(SubGroup {
            number,
            cabinet: None,
            teacher: format!("{surname} {}.{}.", &caps[2], &caps[3]),
        });
    }

    backfill_numbers(&mut sub_groups);

    (name.unwrap_or_default(), sub_groups)
}

/// Strip line breaks, collapse whitespace and drop one trailing period.
fn clean_name(text: &str) -> String {
    let cleaned = trim_all(&text.replace(['\t', '\n'], ""));
    cleaned
        .strip_suffix('.')
        .map(str::to_string)
        .unwrap_or(cleaned)
}

/// Assign subgroup numbers where the source text carried none.
fn backfill_numbers(sub_groups: &mut [SubGroup]) {
    match sub_groups.len() {
        1 => sub_groups[0].number = 1,
        2 => {
            if sub_groups[0].number == 0 && sub_groups[1].number == 0 {
                sub_groups[0].number = 1;
                sub_groups[1].number = 2;
            } else if sub_groups[0].number == 0 {
                sub_groups[0].number = if sub_groups[1].number == 1 { 2 } else { 1 };
            } else if sub_groups[1].number == 0 {
                sub_groups[1].number = if sub_groups[0].number == 1 { 2 } else { 1 };
            }
        }
        _ => {}
    }
}

/// Whitespace-separated cabinet tokens from the adjacent column.
fn parse_cabinets(grid: &SheetGrid, row: u32, column: u32) -> Vec<String> {
    grid.text(row, column)
        .map(|raw| raw.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Resolve cabinets for the subgroups of a default lesson.
///
/// One cabinet broadcasts to every subgroup; a matching count assigns
/// positionally by subgroup number; surplus cabinets become synthetic
/// subgroups marking a schedule inconsistency; a shortage is irreconcilable
/// and fails the parse; no cabinets at all resolve to the unknown marker.
fn resolve_cabinets(
    grid: &SheetGrid,
    row: u32,
    column: u32,
    sub_groups: &mut Vec<SubGroup>,
) -> Result<(), ParseError> {
    let cabinets = parse_cabinets(grid, row, column);

    if cabinets.len() == 1 {
        for sub_group in sub_groups.iter_mut() {
            sub_group.cabinet = Some(cabinets[0].clone());
        }
    } else if cabinets.len() == sub_groups.len() {
        for sub_group in sub_groups.iter_mut() {
            let position = sub_group.number.max(1) as usize - 1;
            let cabinet = cabinets.get(position).or_else(|| cabinets.first());
            sub_group.cabinet = cabinet.cloned();
        }
    } else if !cabinets.is_empty() {
        if cabinets.len() > sub_groups.len() {
            log::warn!(
                "cell at row {row}: {} cabinet(s) for {} subgroup(s), fabricating the rest",
                cabinets.len(),
                sub_groups.len()
            );
            for (index, cabinet) in cabinets.iter().enumerate() {
                match sub_groups.get_mut(index) {
                    Some(sub_group) => sub_group.cabinet = Some(cabinet.clone()),
                    None => sub_groups.push(SubGroup {
                        number: index as u8 + 1,
                        cabinet: Some(cabinet.clone()),
                        teacher: SCHEDULE_ERROR_TEACHER.to_string(),
                    }),
                }
            }
        } else {
            return Err(ParseError::CabinetCount {
                cabinets: cabinets.len(),
                sub_groups: sub_groups.len(),
            });
        }
    } else if !sub_groups.is_empty() {
        log::warn!("cell at row {row}: no cabinets for {} subgroup(s)", sub_groups.len());
        for sub_group in sub_groups.iter_mut() {
            sub_group.cabinet = Some(UNKNOWN_CABINET.to_string());
        }
    }

    Ok(())
}
