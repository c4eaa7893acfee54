//! Unified error types for the timegrid engine.
//!
//! Failures fall into two classes with different retry semantics: acquisition
//! errors (the workbook source is unavailable or unacceptable) and structural
//! parse errors (the workbook bytes were obtained but do not follow the
//! expected layout). Acquisition errors are surfaced to the caller untouched;
//! structural errors abort the parse attempt without installing a snapshot.
use thiserror::Error;

/// Acquisition errors: the workbook source could not deliver usable bytes.
///
/// The engine never retries these itself; retry policy belongs to the caller.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure from the HTTP client
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-200 status
    #[error("server returned status code {status}")]
    BadStatusCode { status: u16 },

    /// One of the required headers is missing from the response
    #[error("response is missing a required header (content-type, etag, last-modified or date)")]
    BadHeaders,

    /// The content-type header does not name the expected spreadsheet type
    #[error("content type {got:?} is not {expected:?}")]
    IncorrectFileType { expected: &'static str, got: String },

    /// No download URL has been configured on the fetcher
    #[error("no download url has been configured")]
    MissingUrl,
}

/// Structural parse errors: the workbook does not follow the fixed layout.
///
/// Any of these aborts the current parse; no partial snapshot is produced and
/// the previous snapshot stays authoritative.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The bytes could not be decoded as a workbook
    #[error("workbook could not be decoded: {0}")]
    Workbook(#[from] calamine::XlsxError),

    /// The workbook contains no worksheets
    #[error("workbook contains no worksheets")]
    NoWorksheet,

    /// No day anchors were found in the first column
    #[error("no day anchors found in the first column")]
    NoDayAnchors,

    /// A time-column cell has no recognizable clock range
    #[error("cannot extract a lesson time range from {text:?}")]
    BadTimeRange { text: String },

    /// A day anchor carries an unparseable date
    #[error("cannot parse a date from day anchor {text:?}")]
    BadDayDate { text: String },

    /// A cell names fewer cabinets than it has subgroups
    #[error("{cabinets} cabinet(s) cannot be assigned to {sub_groups} subgroup(s)")]
    CabinetCount { cabinets: usize, sub_groups: usize },
}

/// Main error type for timegrid operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The workbook source failed; see [`FetchError`]
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The workbook violated the layout convention; see [`ParseError`]
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result type for timegrid operations.
pub type Result<T> = std::result::Result<T, Error>;
