use thiserror::Error;

use crate::browser::BrowserError;

#[derive(Debug, Error)]
pub enum AlbumError {
    #[error("Cannot open an album without an authenticated session")]
    NotAuthenticated,

    #[error(transparent)]
    Browser(#[from] BrowserError),
}
