//! Reference HTTP fetcher.
//!
//! Mirrors the source site's contract: a HEAD request carries everything the
//! cache-hit decision needs (entity tag, last-modified, request date), and a
//! GET downloads the workbook itself. The fetcher validates a new URL with a
//! verified head probe before adopting it.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, DATE, ETAG, HeaderMap, LAST_MODIFIED, USER_AGENT};

use super::{
    FetchFailure, FetchResult, FetchSuccess, SPREADSHEET_CONTENT_TYPE, WorkbookFetcher,
};
use crate::error::FetchError;

const DEFAULT_USER_AGENT: &str = concat!("timegrid/", env!("CARGO_PKG_VERSION"));

/// Fetches workbook revisions over HTTP.
pub struct HttpWorkbookFetcher {
    client: reqwest::Client,
    url: RwLock<Option<String>>,
    user_agent: String,
}

impl HttpWorkbookFetcher {
    /// Create a fetcher with no download URL configured.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: RwLock::new(None),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the user agent sent with every request.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Currently configured download URL.
    pub fn url(&self) -> Option<String> {
        self.url.read().clone()
    }

    /// Validate `url` with a head probe and adopt it on success.
    pub async fn set_url(&self, url: impl Into<String>) -> Result<(), FetchError> {
        let url = url.into();
        self.fetch_url(&url, true).await?.verify()?;

        *self.url.write() = Some(url);
        Ok(())
    }

    /// Fetch a specific URL without touching the configured one.
    pub async fn fetch_url(&self, url: &str, head_only: bool) -> Result<FetchResult, FetchError> {
        let request = if head_only {
            self.client.head(url)
        } else {
            self.client.get(url)
        };
        let response = request.header(USER_AGENT, &self.user_agent).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            log::error!("workbook source answered {status} for {url}");
            return Ok(FetchResult::Fail(FetchFailure::BadStatusCode {
                status: status.as_u16(),
            }));
        }

        let Some(headers) = RequiredHeaders::extract(response.headers()) else {
            return Ok(FetchResult::Fail(FetchFailure::BadHeaders));
        };

        if headers.content_type != SPREADSHEET_CONTENT_TYPE {
            return Ok(FetchResult::Fail(FetchFailure::IncorrectFileType {
                content_type: headers.content_type,
            }));
        }

        let data = if head_only {
            None
        } else {
            Some(response.bytes().await?)
        };

        Ok(FetchResult::Success(FetchSuccess {
            etag: headers.etag,
            uploaded_at: headers.uploaded_at,
            requested_at: headers.requested_at,
            data,
        }))
    }
}

impl Default for HttpWorkbookFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookFetcher for HttpWorkbookFetcher {
    fn fetch(
        &self,
        head_only: bool,
    ) -> impl Future<Output = Result<FetchResult, FetchError>> + Send {
        async move {
            let url = self.url().ok_or(FetchError::MissingUrl)?;
            self.fetch_url(&url, head_only).await
        }
    }
}

struct RequiredHeaders {
    content_type: String,
    etag: String,
    uploaded_at: DateTime<Utc>,
    requested_at: DateTime<Utc>,
}

impl RequiredHeaders {
    /// All four required headers, or `None` when any is missing or unreadable.
    fn extract(headers: &HeaderMap) -> Option<Self> {
        let text = |name| headers.get(name)?.to_str().ok();

        Some(Self {
            content_type: text(CONTENT_TYPE)?.to_string(),
            etag: text(ETAG)?.to_string(),
            uploaded_at: http_date(text(LAST_MODIFIED)?)?,
            requested_at: http_date(text(DATE)?)?,
        })
    }
}

fn http_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
