//! Workbook acquisition contract.
//!
//! The engine only ever talks to a [`WorkbookFetcher`]: a head-only probe
//! supplies the revision metadata driving the cache-hit decision, and a full
//! fetch supplies the bytes. The reference HTTP implementation lives in
//! [`http`]; tests substitute scripted fetchers.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::FetchError;

pub mod http;

pub use http::HttpWorkbookFetcher;

/// Content type the source must declare for its workbook.
pub const SPREADSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Metadata (and, for full fetches, bytes) of one workbook revision.
#[derive(Debug, Clone)]
pub struct FetchSuccess {
    /// Content fingerprint from the entity tag header
    pub etag: String,
    /// Last-modified timestamp of the workbook on the source
    pub uploaded_at: DateTime<Utc>,
    /// Server date of this request
    pub requested_at: DateTime<Utc>,
    /// Workbook bytes; `None` for head-only probes
    pub data: Option<Bytes>,
}

/// Why a fetch was unacceptable despite the transport succeeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Non-200 response
    BadStatusCode { status: u16 },
    /// A required header is missing or unreadable
    BadHeaders,
    /// The declared content type is not the spreadsheet type
    IncorrectFileType { content_type: String },
}

/// Outcome of one fetch attempt.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Success(FetchSuccess),
    Fail(FetchFailure),
}

impl FetchResult {
    /// Turn a failed fetch into its typed acquisition error.
    pub fn verify(self) -> Result<FetchSuccess, FetchError> {
        match self {
            FetchResult::Success(success) => Ok(success),
            FetchResult::Fail(FetchFailure::BadStatusCode { status }) => {
                Err(FetchError::BadStatusCode { status })
            }
            FetchResult::Fail(FetchFailure::BadHeaders) => Err(FetchError::BadHeaders),
            FetchResult::Fail(FetchFailure::IncorrectFileType { content_type }) => {
                Err(FetchError::IncorrectFileType {
                    expected: SPREADSHEET_CONTENT_TYPE,
                    got: content_type,
                })
            }
        }
    }
}

/// Source of workbook revisions.
///
/// `head_only` probes must be cheap: they are issued on every engine call,
/// while full fetches only happen when the fingerprint changed.
pub trait WorkbookFetcher: Send + Sync {
    fn fetch(
        &self,
        head_only: bool,
    ) -> impl Future<Output = Result<FetchResult, FetchError>> + Send;
}

impl<T: WorkbookFetcher> WorkbookFetcher for std::sync::Arc<T> {
    fn fetch(
        &self,
        head_only: bool,
    ) -> impl Future<Output = Result<FetchResult, FetchError>> + Send {
        self.as_ref().fetch(head_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_maps_failures_to_typed_errors() {
        let fail = FetchResult::Fail(FetchFailure::BadStatusCode { status: 503 });
        assert!(matches!(
            fail.verify(),
            Err(FetchError::BadStatusCode { status: 503 })
        ));

        let fail = FetchResult::Fail(FetchFailure::IncorrectFileType {
            content_type: "text/html".into(),
        });
        assert!(matches!(
            fail.verify(),
            Err(FetchError::IncorrectFileType { got, .. }) if got == "text/html"
        ));
    }

    #[test]
    fn test_verify_passes_success_through() {
        let success = FetchResult::Success(FetchSuccess {
            etag: "\"abc\"".into(),
            uploaded_at: Utc::now(),
            requested_at: Utc::now(),
            data: None,
        });
        assert!(success.verify().is_ok());
    }
}
