//! Change detection between successive snapshots.
//!
//! Days are compared by a SHA-256 hash over their canonical JSON form, so
//! dependents (cache, push notifications) react only to real content changes
//! and not to re-downloads of identical data. Diffs cover names present in
//! both snapshots; a brand-new group or teacher gets no diff entry at all.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::{Group, Teacher};

/// Hex SHA-256 over the canonical JSON serialization of a value.
pub fn content_hash<T: Serialize>(value: &T) -> String {
    let mut hasher = Sha256::new();
    // serialization of the plain data model cannot fail
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    hasher.update(&bytes);

    to_hex(&hasher.finalize())
}

fn to_hex(digest: &[u8]) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Day indices whose content changed, per group name present in both maps.
///
/// A day index missing from the previous snapshot counts as changed; groups
/// with no changed days get no entry.
pub fn diff_groups(
    previous: &BTreeMap<String, Group>,
    current: &BTreeMap<String, Group>,
) -> BTreeMap<String, Vec<usize>> {
    let mut updated = BTreeMap::new();

    for (name, previous_group) in previous {
        let Some(current_group) = current.get(name) else {
            continue;
        };

        let changed: Vec<usize> = current_group
            .days
            .iter()
            .enumerate()
            .filter(|(index, day)| {
                previous_group.days.get(*index).map(content_hash) != Some(content_hash(day))
            })
            .map(|(index, _)| index)
            .collect();

        if !changed.is_empty() {
            updated.insert(name.clone(), changed);
        }
    }

    updated
}

/// Like [`diff_groups`], over the derived teacher schedules.
pub fn diff_teachers(
    previous: &BTreeMap<String, Teacher>,
    current: &BTreeMap<String, Teacher>,
) -> BTreeMap<String, Vec<usize>> {
    let mut updated = BTreeMap::new();

    for (name, previous_teacher) in previous {
        let Some(current_teacher) = current.get(name) else {
            continue;
        };

        let changed: Vec<usize> = current_teacher
            .days
            .iter()
            .enumerate()
            .filter(|(index, day)| {
                previous_teacher.days.get(*index).map(content_hash) != Some(content_hash(day))
            })
            .map(|(index, _)| index)
            .collect();

        if !changed.is_empty() {
            updated.insert(name.clone(), changed);
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Day, Lesson, TimeRange};
    use chrono::NaiveDate;

    fn day(date: NaiveDate, lesson_name: &str) -> Day {
        let time = TimeRange::new(
            date.and_hms_opt(8, 30, 0).unwrap(),
            date.and_hms_opt(9, 15, 0).unwrap(),
        );
        Day {
            name: "Понедельник".into(),
            street: None,
            date,
            lessons: vec![Lesson::Additional {
                name: lesson_name.into(),
                time,
            }],
        }
    }

    fn group(name: &str, lesson_names: &[&str]) -> Group {
        let base = NaiveDate::from_ymd_opt(2024, 10, 6).unwrap();
        Group {
            name: name.into(),
            days: lesson_names
                .iter()
                .enumerate()
                .map(|(i, lesson_name)| day(base + chrono::Days::new(i as u64), lesson_name))
                .collect(),
        }
    }

    fn groups(entries: &[(&str, &[&str])]) -> BTreeMap<String, Group> {
        entries
            .iter()
            .map(|(name, lessons)| (name.to_string(), group(name, lessons)))
            .collect()
    }

    #[test]
    fn test_content_hash_is_stable_and_content_sensitive() {
        let base = NaiveDate::from_ymd_opt(2024, 10, 6).unwrap();
        assert_eq!(content_hash(&day(base, "a")), content_hash(&day(base, "a")));
        assert_ne!(content_hash(&day(base, "a")), content_hash(&day(base, "b")));
    }

    #[test]
    fn test_changed_day_index_reported() {
        let previous = groups(&[("ИС-214/23", &["a", "b", "c", "d"])]);
        let current = groups(&[("ИС-214/23", &["a", "b", "c", "x"])]);

        let updated = diff_groups(&previous, &current);
        assert_eq!(updated["ИС-214/23"], vec![3]);
    }

    #[test]
    fn test_unchanged_group_absent_from_diff() {
        let previous = groups(&[("ИС-214/23", &["a", "b"])]);
        let current = previous.clone();

        assert!(diff_groups(&previous, &current).is_empty());
    }

    #[test]
    fn test_new_group_gets_no_entry() {
        let previous = groups(&[("ИС-214/23", &["a"])]);
        let current = groups(&[("ИС-214/23", &["a"]), ("СА-114/24", &["b"])]);

        let updated = diff_groups(&previous, &current);
        assert!(!updated.contains_key("СА-114/24"));
    }

    #[test]
    fn test_day_added_beyond_previous_length_counts_as_changed() {
        let previous = groups(&[("ИС-214/23", &["a"])]);
        let current = groups(&[("ИС-214/23", &["a", "b"])]);

        let updated = diff_groups(&previous, &current);
        assert_eq!(updated["ИС-214/23"], vec![1]);
    }
}
