//! Parse snapshots and the events derived from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::day::Group;
use super::lesson::{FOREIGN_GROUP_TEACHER, SCHEDULE_ERROR_TEACHER};
use super::teacher::Teacher;

/// Immutable result of one successful parse run.
///
/// A snapshot is produced atomically and never mutated afterwards; a later
/// parse either returns the same snapshot (cache hit) or installs a fresh one
/// that supersedes it. The `updated_*` maps are always relative to the
/// immediately preceding snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseSnapshot {
    /// Content fingerprint of the workbook revision
    pub etag: String,
    /// Identity of the replacer entry that supplied the bytes, if any
    pub replacer_id: Option<String>,
    /// When the workbook was uploaded to the source site
    pub uploaded_at: DateTime<Utc>,
    /// When this revision was fetched
    pub downloaded_at: DateTime<Utc>,
    /// Group schedules keyed by group name
    pub groups: BTreeMap<String, Group>,
    /// Derived teacher schedules keyed by teacher name
    pub teachers: BTreeMap<String, Teacher>,
    /// Changed day indices per group, relative to the previous snapshot
    pub updated_groups: BTreeMap<String, Vec<usize>>,
    /// Changed day indices per teacher, relative to the previous snapshot
    pub updated_teachers: BTreeMap<String, Vec<usize>>,
}

impl ParseSnapshot {
    /// Names of all parsed groups.
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Names of all derived teachers, with sentinel entries filtered out.
    pub fn teacher_names(&self) -> Vec<&str> {
        self.teachers
            .keys()
            .map(String::as_str)
            .filter(|name| *name != SCHEDULE_ERROR_TEACHER && *name != FOREIGN_GROUP_TEACHER)
            .collect()
    }
}

/// Emitted when the content fingerprint changes from a previously-established
/// one. Never emitted for the very first parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub etag: String,
    /// Whether the current content comes from a manual replacer override
    pub replaced_by_overlay: bool,
}

/// Point-in-time view of the engine's cache, for operational surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    /// Hash of the currently established fingerprint
    pub cache_hash: String,
    /// Whether the cache is older than the configured invalidation delay
    pub cache_update_required: bool,
    pub last_cache_update: DateTime<Utc>,
    pub last_schedule_update: DateTime<Utc>,
}
