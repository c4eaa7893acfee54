//! Schedule assembly: groups from cells, teachers from groups.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::segment::{CellOutcome, segment_cell};
use super::skeleton::Skeleton;
use super::slots::extract_day_slots;
use crate::error::ParseError;
use crate::grid::SheetGrid;
use crate::model::{Day, Group, Lesson, Teacher, TeacherDay, TeacherLesson};

/// Build every group's schedule from the skeleton.
///
/// Time slots are extracted once per day band and shared by all groups: the
/// layout convention guarantees a single time grid for the whole sheet.
pub fn assemble_groups(
    grid: &SheetGrid,
    skeleton: &Skeleton,
) -> Result<BTreeMap<String, Group>, ParseError> {
    let time_column = skeleton.days[0].column + 1;
    let sheet_end_row = grid.end().row;

    // day names, dates and slot lists, extracted once and reused per group
    let mut day_frames = Vec::with_capacity(skeleton.days.len());
    for (index, anchor) in skeleton.days.iter().enumerate() {
        let (name, date) = split_day_anchor(&anchor.text)?;
        let band_end = skeleton
            .days
            .get(index + 1)
            .map(|next| next.row)
            .unwrap_or(sheet_end_row);
        let slots = extract_day_slots(grid, date, anchor.row..band_end, time_column)?;
        day_frames.push((name, date, slots));
    }

    let mut groups = BTreeMap::new();

    for group_anchor in &skeleton.groups {
        let mut days = Vec::with_capacity(day_frames.len());

        for (name, date, slots) in &day_frames {
            let mut day = Day {
                name: name.clone(),
                street: None,
                date: *date,
                lessons: Vec::new(),
            };

            for slot in slots {
                match segment_cell(grid, slots, slot, group_anchor.column, day.lessons.last())? {
                    CellOutcome::Street(street) => day.street = Some(street),
                    CellOutcome::Lessons(lessons) => day.lessons.extend(lessons),
                }
            }

            days.push(day);
        }

        groups.insert(
            group_anchor.text.clone(),
            Group {
                name: group_anchor.text.clone(),
                days,
            },
        );
    }

    Ok(groups)
}

/// Derive teacher schedules by inverting the groups' default lessons.
///
/// Every subgroup of every default lesson buckets a group-tagged copy of the
/// lesson into its teacher's day; days and lessons are then sorted so the
/// projection is chronological regardless of group iteration order.
pub fn derive_teachers(groups: &BTreeMap<String, Group>) -> BTreeMap<String, Teacher> {
    let mut teachers: BTreeMap<String, Teacher> = BTreeMap::new();

    for (group_name, group) in groups {
        for day in &group.days {
            for lesson in &day.lessons {
                let Lesson::Default {
                    name,
                    time,
                    default_range,
                    sub_groups,
                } = lesson
                else {
                    continue;
                };

                for sub_group in sub_groups {
                    let teacher = teachers
                        .entry(sub_group.teacher.clone())
                        .or_insert_with(|| Teacher {
                            name: sub_group.teacher.clone(),
                            days: Vec::new(),
                        });

                    let day_index = match teacher.days.iter().position(|d| d.name == day.name) {
                        Some(index) => index,
                        None => {
                            teacher.days.push(TeacherDay {
                                name: day.name.clone(),
                                date: day.date,
                                lessons: Vec::new(),
                            });
                            teacher.days.len() - 1
                        }
                    };

                    teacher.days[day_index].lessons.push(TeacherLesson {
                        group: group_name.clone(),
                        name: name.clone(),
                        time: *time,
                        default_range: *default_range,
                        sub_groups: sub_groups.clone(),
                    });
                }
            }
        }
    }

    for teacher in teachers.values_mut() {
        for day in &mut teacher.days {
            day.lessons.sort_by_key(|lesson| lesson.time.start);
        }
        teacher.days.sort_by_key(|day| day.date);
    }

    teachers
}

/// Split a day anchor into its day word and date.
fn split_day_anchor(text: &str) -> Result<(String, NaiveDate), ParseError> {
    let bad = || ParseError::BadDayDate {
        text: text.to_string(),
    };

    let (name, date_text) = text.split_once(' ').ok_or_else(bad)?;
    let date = NaiveDate::parse_from_str(date_text, "%d.%m.%y")
        .or_else(|_| NaiveDate::parse_from_str(date_text, "%d.%m.%Y"))
        .map_err(|_| bad())?;

    Ok((name.to_string(), date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellRange, CellRef};
    use crate::model::SubGroup;
    use crate::parse::scan_skeleton;

    /// One-week sheet with two groups, one day band of two slots.
    fn sheet() -> SheetGrid {
        let mut grid = SheetGrid::new(CellRef::new(12, 5));
        grid.set_text(1, 2, "ИС-214/23");
        grid.set_text(1, 4, "СА-114/24");

        grid.set_text(2, 0, "Понедельник 06.10.24");
        grid.set_text(2, 1, "1 пара 8:30-9:15");
        grid.set_text(4, 1, "2 пара 9:30-10:15");

        // ИС-214/23: two lessons with a gap
        grid.set_text(2, 2, "Элементы высшей математики ИвановИИ");
        grid.set_text(2, 3, "301");
        grid.set_text(4, 2, "Физика ПетровПП");
        grid.set_text(4, 3, "302");

        // СА-114/24: street override plus one lesson
        grid.set_text(2, 4, "Полтавская, 15");
        grid.set_text(4, 4, "Информатика ИвановИИ");
        grid.set_text(4, 5, "303");

        grid
    }

    #[test]
    fn test_assemble_builds_all_groups() {
        let grid = sheet();
        let skeleton = scan_skeleton(&grid).unwrap();
        let groups = assemble_groups(&grid, &skeleton).unwrap();

        assert_eq!(groups.len(), 2);

        let group = &groups["ИС-214/23"];
        assert_eq!(group.days.len(), 1);
        let day = &group.days[0];
        assert_eq!(day.name, "Понедельник");
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 10, 6).unwrap());
        // lesson, bridging break, lesson
        assert_eq!(day.lessons.len(), 3);
        assert_eq!(day.lessons[1].kind(), crate::model::LessonKind::Break);

        let other = &groups["СА-114/24"];
        let day = &other.days[0];
        assert_eq!(day.street.as_deref(), Some("Полтавская, 15"));
        assert_eq!(day.lessons.len(), 1);
        assert_eq!(day.lessons[0].name(), Some("Информатика"));
    }

    #[test]
    fn test_teachers_derived_from_both_groups() {
        let grid = sheet();
        let skeleton = scan_skeleton(&grid).unwrap();
        let groups = assemble_groups(&grid, &skeleton).unwrap();
        let teachers = derive_teachers(&groups);

        let ivanov = &teachers["Иванов И.И."];
        assert_eq!(ivanov.days.len(), 1);
        let lessons = &ivanov.days[0].lessons;
        assert_eq!(lessons.len(), 2);
        // sorted by start time: 8:30 before 9:30
        assert_eq!(lessons[0].group, "ИС-214/23");
        assert_eq!(lessons[1].group, "СА-114/24");

        // breaks and non-default lessons never reach teachers
        assert!(teachers.values().all(|t| {
            t.days
                .iter()
                .flat_map(|d| &d.lessons)
                .all(|l| !l.sub_groups.is_empty())
        }));
    }

    #[test]
    fn test_sub_group_cloned_into_teacher_lesson() {
        let grid = sheet();
        let skeleton = scan_skeleton(&grid).unwrap();
        let groups = assemble_groups(&grid, &skeleton).unwrap();
        let teachers = derive_teachers(&groups);

        let petrov = &teachers["Петров П.П."];
        assert_eq!(
            petrov.days[0].lessons[0].sub_groups,
            vec![SubGroup {
                number: 1,
                cabinet: Some("302".into()),
                teacher: "Петров П.П.".into(),
            }]
        );
    }

    #[test]
    fn test_unparseable_day_date_is_fatal() {
        assert!(matches!(
            split_day_anchor("Понедельник 99.99.99"),
            Err(ParseError::BadDayDate { .. })
        ));
        assert!(split_day_anchor("Понедельник 06.10.24").is_ok());
        assert!(split_day_anchor("Понедельник 06.10.2024").is_ok());
    }

    #[test]
    fn test_merged_time_cell_spanning_rows() {
        let mut grid = sheet();
        // slot text merged over rows 2-3 in the time column
        grid.add_merge(CellRange::new(CellRef::new(2, 1), CellRef::new(3, 1)));

        let skeleton = scan_skeleton(&grid).unwrap();
        let groups = assemble_groups(&grid, &skeleton).unwrap();
        assert_eq!(groups["ИС-214/23"].days[0].lessons.len(), 3);
    }
}
