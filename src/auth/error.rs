use thiserror::Error;

use crate::browser::BrowserError;

/// Reasons a session could not be established. All of them end the run.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Expected login markup is missing; the page structure has likely changed.
    #[error("Login form not found ({0}); page structure may have changed")]
    FormNotFound(&'static str),

    #[error("Login failed: credentials rejected or account blocked (block notice present: {blocked})")]
    Rejected { blocked: bool },

    #[error("Two-step verification was not completed")]
    ChallengeAborted,

    #[error(transparent)]
    Browser(#[from] BrowserError),
}
