use thiserror::Error;

use crate::retry::Transient;

/// Typed image fetch errors, classified for the retry loop.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Network error fetching {url}: {source}")]
    Http { source: reqwest::Error, url: String },

    #[error("Disk error: {0}")]
    Disk(#[from] std::io::Error),
}

impl Transient for DownloadError {
    /// Rate limits, server errors and dropped connections are worth retrying.
    /// Client errors and local disk failures are not.
    fn is_transient(&self) -> bool {
        match self {
            DownloadError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            DownloadError::Http { .. } => true,
            DownloadError::Disk(_) => false,
        }
    }
}
