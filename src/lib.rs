//! Timegrid - schedule parsing and change detection for timetable workbooks
//!
//! This library turns a weekly timetable distributed as a fixed-layout
//! spreadsheet into a normalized, queryable schedule for student groups and
//! teachers, and tracks what changed between successive revisions so that
//! dependents (caches, push notifications) react only to real changes.
//!
//! # Features
//!
//! - **Skeleton discovery**: locates day rows and group columns in the grid
//! - **Time-slot extraction**: one shared time grid per parse
//! - **Cell segmentation**: lesson kind, name, teachers, subgroups, cabinets
//! - **Teacher projection**: per-teacher schedules derived from the groups
//! - **Change tracking**: content-hash diffs against the previous snapshot
//! - **Replacer overlay**: manual byte substitution keyed by fingerprint
//!
//! # Example - Parsing a published schedule
//!
//! ```no_run
//! use timegrid::{HttpWorkbookFetcher, ScheduleEngine};
//!
//! # async fn run() -> timegrid::Result<()> {
//! let fetcher = HttpWorkbookFetcher::new();
//! fetcher.set_url("https://example.org/schedule.xlsx").await?;
//!
//! let engine = ScheduleEngine::new(fetcher);
//! let snapshot = engine.schedule().await?;
//!
//! let group = &snapshot.groups["ИС-214/23"];
//! for day in &group.days {
//!     println!("{} {}: {} lesson(s)", day.name, day.date, day.lessons.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reacting to schedule changes
//!
//! ```no_run
//! use timegrid::{HttpWorkbookFetcher, ScheduleEngine};
//!
//! # async fn run() -> timegrid::Result<()> {
//! let fetcher = HttpWorkbookFetcher::new();
//! fetcher.set_url("https://example.org/schedule.xlsx").await?;
//! let engine = ScheduleEngine::new(fetcher);
//!
//! let mut changes = engine.subscribe();
//! engine.schedule().await?;
//!
//! while let Ok(event) = changes.recv().await {
//!     println!("schedule {} changed (override: {})", event.etag, event.replaced_by_overlay);
//! }
//! # Ok(())
//! # }
//! ```

/// Change detection between successive snapshots
pub mod diff;
/// The engine façade tying fetch, parse and diff together
pub mod engine;
/// Unified error types
pub mod error;
/// Workbook acquisition contract and the reference HTTP fetcher
pub mod fetch;
/// Cell grid abstraction and workbook decoding
pub mod grid;
/// The parsed-schedule data model
pub mod model;
/// The parsing stages
pub mod parse;
/// Manual schedule replacement overlay
pub mod replacer;

// Re-export the common surface for convenience
pub use engine::{ScheduleEngine, SnapshotHolder};
pub use error::{Error, FetchError, ParseError, Result};
pub use fetch::{FetchFailure, FetchResult, FetchSuccess, HttpWorkbookFetcher, WorkbookFetcher};
pub use model::{
    CacheStatus, ChangeEvent, Day, Group, Lesson, LessonKind, ParseSnapshot, SubGroup, Teacher,
    TeacherDay, TeacherLesson, TimeRange,
};
pub use replacer::{MemoryReplacer, NoReplacer, ReplacerOverlay};
