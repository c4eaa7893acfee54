//! The schedule engine: fetch, cache-hit, parse, diff, install, notify.
//!
//! One [`ScheduleEngine::schedule`] call probes the source for revision
//! metadata, returns the cached snapshot when neither the fingerprint nor
//! the active replacer changed, and otherwise acquires the bytes, runs the
//! parsing stages and installs a fresh immutable snapshot.
//!
//! The engine is logically single-writer. Concurrent calls are safe in the
//! sense that snapshots are installed by atomic `Arc` replacement and the
//! computation is idempotent per fingerprint; a race costs at most a
//! redundant recomputation, never a torn snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use crate::diff::{content_hash, diff_groups, diff_teachers};
use crate::error::{FetchError, Result};
use crate::fetch::WorkbookFetcher;
use crate::grid::SheetGrid;
use crate::model::{CacheStatus, ChangeEvent, ParseSnapshot};
use crate::parse::{assemble_groups, derive_teachers, scan_skeleton};
use crate::replacer::{NoReplacer, ReplacerOverlay};

/// Capacity of the change-event channel; events are tiny and consumers are
/// expected to drain promptly.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Hash value reported before the first successful parse.
const EMPTY_CACHE_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// The engine's single snapshot slot.
///
/// Readers get an `Arc` they can hold across engine updates; writers replace
/// the whole pointer, so a reader never observes a half-installed snapshot.
#[derive(Default)]
pub struct SnapshotHolder {
    slot: RwLock<Option<Arc<ParseSnapshot>>>,
}

impl SnapshotHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if any parse has succeeded yet.
    pub fn load(&self) -> Option<Arc<ParseSnapshot>> {
        self.slot.read().clone()
    }

    /// Atomically install a new snapshot.
    pub fn replace(&self, snapshot: Arc<ParseSnapshot>) {
        *self.slot.write() = Some(snapshot);
    }
}

struct EngineState {
    /// Fingerprint change events are emitted relative to this
    established_etag: Option<String>,
    cache_hash: String,
    cache_updated_at: DateTime<Utc>,
    schedule_updated_at: DateTime<Utc>,
}

/// Schedule parsing and change-detection engine.
///
/// Generic over its two collaborators: the workbook fetcher and an optional
/// replacer overlay.
///
/// # Examples
///
/// ```no_run
/// use timegrid::{HttpWorkbookFetcher, ScheduleEngine};
///
/// # async fn run() -> timegrid::Result<()> {
/// let fetcher = HttpWorkbookFetcher::new();
/// fetcher.set_url("https://example.org/schedule.xlsx").await?;
///
/// let engine = ScheduleEngine::new(fetcher);
/// let snapshot = engine.schedule().await?;
/// for name in snapshot.group_names() {
///     println!("{name}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ScheduleEngine<F, R = NoReplacer> {
    fetcher: F,
    replacer: Option<R>,
    holder: SnapshotHolder,
    state: Mutex<EngineState>,
    events: broadcast::Sender<ChangeEvent>,
    invalidate_after: TimeDelta,
}

impl<F: WorkbookFetcher> ScheduleEngine<F> {
    /// Engine without a replacer overlay.
    pub fn new(fetcher: F) -> Self {
        Self::build(fetcher, None)
    }
}

impl<F: WorkbookFetcher, R: ReplacerOverlay> ScheduleEngine<F, R> {
    /// Engine consulting `replacer` before every download.
    pub fn with_replacer(fetcher: F, replacer: R) -> Self {
        Self::build(fetcher, Some(replacer))
    }

    fn build(fetcher: F, replacer: Option<R>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            replacer,
            holder: SnapshotHolder::new(),
            state: Mutex::new(EngineState {
                established_etag: None,
                cache_hash: EMPTY_CACHE_HASH.to_string(),
                cache_updated_at: DateTime::UNIX_EPOCH,
                schedule_updated_at: DateTime::UNIX_EPOCH,
            }),
            events,
            invalidate_after: TimeDelta::minutes(5),
        }
    }

    /// Override the delay after which [`CacheStatus`] reports the cache as
    /// requiring an update.
    pub fn with_invalidate_after(mut self, delay: TimeDelta) -> Self {
        self.invalidate_after = delay;
        self
    }

    /// The fetcher collaborator, e.g. to reconfigure its URL.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Subscribe to fingerprint change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Currently installed snapshot without touching the source.
    pub fn cached(&self) -> Option<Arc<ParseSnapshot>> {
        self.holder.load()
    }

    /// Operational view of the engine's cache.
    pub fn cache_status(&self) -> CacheStatus {
        let state = self.state.lock();
        CacheStatus {
            cache_hash: state.cache_hash.clone(),
            cache_update_required: Utc::now() - state.cache_updated_at >= self.invalidate_after,
            last_cache_update: state.cache_updated_at,
            last_schedule_update: state.schedule_updated_at,
        }
    }

    /// Current schedule: the cached snapshot when the source is unchanged,
    /// a freshly parsed one otherwise.
    pub async fn schedule(&self) -> Result<Arc<ParseSnapshot>> {
        let head = self.fetcher.fetch(true).await?.verify()?;

        let overlay = match &self.replacer {
            Some(replacer) => replacer.get_by_etag(&head.etag).await,
            None => None,
        };

        if let Some(last) = self.holder.load()
            && last.etag == head.etag
        {
            let overlay_unchanged = match &overlay {
                None => true,
                Some(entry) => last.replacer_id.as_deref() == Some(entry.id.as_str()),
            };
            if overlay_unchanged {
                log::debug!("cache hit for fingerprint {}", head.etag);
                self.note_result(&last).await;
                return Ok(last);
            }
        }

        let data = match &overlay {
            Some(entry) => {
                log::info!("using replacer {} for fingerprint {}", entry.id, head.etag);
                entry.data.clone()
            }
            None => {
                let full = self.fetcher.fetch(false).await?.verify()?;
                full.data.ok_or(FetchError::BadHeaders)?
            }
        };

        let grid = SheetGrid::from_xlsx_bytes(&data)?;
        let skeleton = scan_skeleton(&grid)?;
        let groups = assemble_groups(&grid, &skeleton)?;
        let teachers = derive_teachers(&groups);

        let previous = self.holder.load();
        let (updated_groups, updated_teachers) = match &previous {
            Some(previous) => {
                let group_diff = diff_groups(&previous.groups, &groups);
                let teacher_diff = diff_teachers(&previous.teachers, &teachers);
                (
                    // an empty diff on a changed fingerprint keeps the
                    // pending "what changed" signal alive for consumers
                    if group_diff.is_empty() {
                        previous.updated_groups.clone()
                    } else {
                        group_diff
                    },
                    if teacher_diff.is_empty() {
                        previous.updated_teachers.clone()
                    } else {
                        teacher_diff
                    },
                )
            }
            None => (BTreeMap::new(), BTreeMap::new()),
        };

        let snapshot = Arc::new(ParseSnapshot {
            etag: head.etag.clone(),
            replacer_id: overlay.as_ref().map(|entry| entry.id.clone()),
            uploaded_at: head.uploaded_at,
            downloaded_at: head.requested_at,
            groups,
            teachers,
            updated_groups,
            updated_teachers,
        });

        self.holder.replace(Arc::clone(&snapshot));
        log::info!(
            "installed snapshot {}: {} group(s), {} teacher(s)",
            snapshot.etag,
            snapshot.groups.len(),
            snapshot.teachers.len()
        );

        self.note_result(&snapshot).await;
        Ok(snapshot)
    }

    /// Track the fingerprint the caller last saw and emit a change event
    /// when it moves away from an established one.
    async fn note_result(&self, snapshot: &ParseSnapshot) {
        let now = Utc::now();

        let changed_to = {
            let mut state = self.state.lock();
            state.cache_updated_at = now;

            if state.established_etag.as_deref() == Some(snapshot.etag.as_str()) {
                None
            } else {
                let first = state.established_etag.is_none();
                state.established_etag = Some(snapshot.etag.clone());
                state.cache_hash = content_hash(&snapshot.etag);
                state.schedule_updated_at = now;
                // the very first fingerprint establishes the baseline
                (!first).then(|| snapshot.etag.clone())
            }
        };

        if let Some(etag) = changed_to {
            let replaced_by_overlay = match &self.replacer {
                Some(replacer) => replacer.has_by_etag(&etag).await,
                None => false,
            };

            let event = ChangeEvent {
                etag,
                replaced_by_overlay,
            };
            log::info!("schedule fingerprint changed to {}", event.etag);
            let _ = self.events.send(event);
        }
    }
}
