use thiserror::Error;

/// Failures surfaced by a [`super::Browser`] implementation.
///
/// Element absence is not represented here: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Another element would receive the click (overlay, sticky header, ...).
    #[error("element click intercepted")]
    ClickIntercepted,

    #[error("stale element reference")]
    StaleElement,

    #[error("WebDriver session failed: {0}")]
    Session(String),

    #[error("WebDriver command failed: {0}")]
    Command(String),
}

impl BrowserError {
    /// The WebDriver session is gone; nothing further can be done in it.
    pub fn is_session_lost(&self) -> bool {
        matches!(self, BrowserError::Session(_))
    }
}
