//! Manual schedule replacement overlay.
//!
//! A replacer substitutes workbook bytes for a given fingerprint, bypassing
//! the network download. It is the escape hatch for publishing a corrected
//! schedule when the source workbook is broken. The engine only reads the
//! overlay; the mutating surface (`set_by_etag`, `clear`) belongs to the
//! administrative layer around it.

use bytes::Bytes;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Replacement bytes for one fingerprint.
#[derive(Debug, Clone)]
pub struct ReplacerEntry {
    /// Identity of this replacement, recorded in the snapshot it produces
    pub id: String,
    pub data: Bytes,
}

/// Listing row of one stored replacement, for administrative surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacerInfo {
    pub etag: String,
    /// Size of the replacement workbook in bytes
    pub size: usize,
}

/// Read side of the overlay, as the engine consumes it.
///
/// Lookups are suspension points: an implementation may sit on a database.
pub trait ReplacerOverlay: Send + Sync {
    /// Replacement for `etag`, if one is active.
    fn get_by_etag(&self, etag: &str) -> impl Future<Output = Option<ReplacerEntry>> + Send;

    /// Whether a replacement for `etag` exists. Used only to annotate change
    /// notifications.
    fn has_by_etag(&self, etag: &str) -> impl Future<Output = bool> + Send;
}

impl<T: ReplacerOverlay> ReplacerOverlay for std::sync::Arc<T> {
    fn get_by_etag(&self, etag: &str) -> impl Future<Output = Option<ReplacerEntry>> + Send {
        self.as_ref().get_by_etag(etag)
    }

    fn has_by_etag(&self, etag: &str) -> impl Future<Output = bool> + Send {
        self.as_ref().has_by_etag(etag)
    }
}

/// The overlay of an engine that has none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReplacer;

impl ReplacerOverlay for NoReplacer {
    fn get_by_etag(&self, _etag: &str) -> impl Future<Output = Option<ReplacerEntry>> + Send {
        std::future::ready(None)
    }

    fn has_by_etag(&self, _etag: &str) -> impl Future<Output = bool> + Send {
        std::future::ready(false)
    }
}

struct StoredReplacer {
    etag: String,
    id: String,
    data: Bytes,
}

/// In-memory replacer store.
#[derive(Default)]
pub struct MemoryReplacer {
    entries: RwLock<Vec<StoredReplacer>>,
}

impl MemoryReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or overwrite) the replacement for `etag`.
    ///
    /// Every call produces a fresh identity, so overwriting the bytes of an
    /// already-replaced fingerprint still invalidates the engine's cache.
    pub fn set_by_etag(&self, etag: impl Into<String>, data: impl Into<Bytes>) {
        let etag = etag.into();
        let mut entries = self.entries.write();

        entries.retain(|entry| entry.etag != etag);
        entries.push(StoredReplacer {
            etag,
            id: Uuid::new_v4().to_string(),
            data: data.into(),
        });
    }

    /// Remove every replacement, returning how many were stored.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        count
    }

    /// Fingerprints and sizes of all stored replacements.
    pub fn entries(&self) -> Vec<ReplacerInfo> {
        self.entries
            .read()
            .iter()
            .map(|entry| ReplacerInfo {
                etag: entry.etag.clone(),
                size: entry.data.len(),
            })
            .collect()
    }
}

impl ReplacerOverlay for MemoryReplacer {
    fn get_by_etag(&self, etag: &str) -> impl Future<Output = Option<ReplacerEntry>> + Send {
        let entry = self
            .entries
            .read()
            .iter()
            .find(|entry| entry.etag == etag)
            .map(|entry| ReplacerEntry {
                id: entry.id.clone(),
                data: entry.data.clone(),
            });
        std::future::ready(entry)
    }

    fn has_by_etag(&self, etag: &str) -> impl Future<Output = bool> + Send {
        let found = self.entries.read().iter().any(|entry| entry.etag == etag);
        std::future::ready(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_etag() {
        let replacer = MemoryReplacer::new();
        replacer.set_by_etag("\"abc\"", b"bytes".as_slice());

        assert!(replacer.has_by_etag("\"abc\"").await);
        assert!(!replacer.has_by_etag("\"other\"").await);

        let entry = replacer.get_by_etag("\"abc\"").await.unwrap();
        assert_eq!(&entry.data[..], b"bytes");
        assert!(replacer.get_by_etag("\"other\"").await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_changes_identity() {
        let replacer = MemoryReplacer::new();
        replacer.set_by_etag("\"abc\"", b"v1".as_slice());
        let first = replacer.get_by_etag("\"abc\"").await.unwrap();

        replacer.set_by_etag("\"abc\"", b"v2".as_slice());
        let second = replacer.get_by_etag("\"abc\"").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(&second.data[..], b"v2");
        assert_eq!(replacer.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_reports_count() {
        let replacer = MemoryReplacer::new();
        replacer.set_by_etag("\"a\"", b"1".as_slice());
        replacer.set_by_etag("\"b\"", b"2".as_slice());

        assert_eq!(
            replacer.entries(),
            vec![
                ReplacerInfo { etag: "\"a\"".into(), size: 1 },
                ReplacerInfo { etag: "\"b\"".into(), size: 1 },
            ]
        );
        assert_eq!(replacer.clear(), 2);
        assert_eq!(replacer.clear(), 0);
        assert!(!replacer.has_by_etag("\"a\"").await);
    }
}
