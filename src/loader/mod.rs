//! Survey data loading.
//!
//! This module fetches the row collection from the spreadsheet endpoint
//! (or a local JSON export) and turns every failure into a [`LoadFailure`].

pub mod fetcher;
pub mod payload;

pub use fetcher::{DataLoader, DataSource, LoaderConfig};

use thiserror::Error;

/// Hints shown to the user whenever loading fails.
pub const TROUBLESHOOTING: &[&str] = &[
    "Ensure the source URL (--url, SURVEYDASH_URL or [source].url) is correct.",
    "In Google Apps Script, re-deploy the script and make sure \"Who has access\" is set to \"Anyone\".",
    "Check that the sheet name in the script ('Data') matches the tab in your Google Sheet.",
];

/// Why a dataset could not be produced. Every variant is terminal for the run.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Network error: {0}")]
    Status(String),

    /// The script reported an error in the body.
    #[error("Script Error: {0}")]
    Server(String),

    /// The body is not JSON.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// The body is JSON but not an array of row objects.
    #[error("Unexpected response shape: expected an array of rows")]
    UnexpectedShape,

    /// A local export could not be read.
    #[error("Cannot read {path}: {message}")]
    File { path: String, message: String },
}
