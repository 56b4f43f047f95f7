//! Run orchestration: login, open the album, then walk it photo by photo.
//!
//! A failure on one photo is logged and counted; traversal always moves on to
//! the next photo. Only a throttle notice, a lost browser session, shutdown or
//! the iteration cap end a run early.

use std::fmt;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::album::{self, Advance, AlbumCursor, AlbumError};
use crate::auth::{self, AuthError, Credentials, OperatorGate};
use crate::browser::{Browser, BrowserError};
use crate::download::{self, DownloadConfig, DownloadOutcome, Fetcher};
use crate::endpoints::Endpoints;
use crate::extract::{self, ExtractError, Extraction};
use crate::types::AlbumKind;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Album(#[from] AlbumError),

    #[error("Browser session failed: {0}")]
    Browser(#[from] BrowserError),
}

/// Harvest settings, decoupled from CLI parsing.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub endpoints: Endpoints,
    pub credentials: Credentials,
    pub account: String,
    pub album: AlbumKind,
    /// Settle time after each forward step.
    pub delay: Duration,
    /// Upper bound on traversal iterations.
    pub max_photos: u64,
    pub download: DownloadConfig,
    pub no_progress_bar: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Traversal returned to the first photo.
    Done,
    /// The site showed a throttle notice.
    Blocked,
    AlbumNotFound,
    Cancelled,
    /// The iteration cap was hit before the cycle closed.
    LimitReached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Photos (not videos) extraction was attempted on.
    pub attempted: u64,
    pub downloaded: u64,
    pub already_present: u64,
    pub would_download: u64,
    pub failed: u64,
    pub videos_skipped: u64,
    /// Pages that had no body to advance from.
    pub anomalies: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub stats: RunStats,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let saved = self.stats.downloaded + self.stats.already_present;
        write!(f, "Downloaded {}/{} photos (of ", saved, self.stats.attempted)?;
        if self.outcome == RunOutcome::Done {
            write!(f, "{} total)", self.stats.attempted)
        } else {
            write!(f, "an unknown total)")
        }
    }
}

/// Log in, open the configured album and download every photo in it.
pub async fn run<B, F>(
    browser: &B,
    fetcher: &F,
    gate: &mut OperatorGate,
    config: &HarvestConfig,
    cancel: &CancellationToken,
) -> Result<RunReport, HarvestError>
where
    B: Browser + ?Sized,
    F: Fetcher + ?Sized,
{
    let session = auth::login(browser, &config.endpoints, &config.credentials, gate).await?;
    tracing::debug!(
        blocked = session.is_blocked(),
        challenge_pending = session.is_challenge_pending(),
        "Session established"
    );

    tracing::info!(account = %config.account, album = %config.album, "Opening album");
    let cursor = album::open_album(
        browser,
        &session,
        &config.endpoints,
        &config.account,
        config.album,
    )
    .await?;
    let Some(mut cursor) = cursor else {
        tracing::warn!(
            "{} does not have a \"{}\" album, or it has no photos",
            config.account,
            config.album
        );
        return Ok(RunReport {
            outcome: RunOutcome::AlbumNotFound,
            stats: RunStats::default(),
        });
    };

    let pb = create_spinner(config.no_progress_bar);
    let mut stats = RunStats::default();
    let outcome = traverse(browser, fetcher, &mut cursor, config, cancel, &mut stats, &pb).await;
    pb.finish_and_clear();
    Ok(RunReport {
        outcome: outcome?,
        stats,
    })
}

async fn traverse<B, F>(
    browser: &B,
    fetcher: &F,
    cursor: &mut AlbumCursor,
    config: &HarvestConfig,
    cancel: &CancellationToken,
    stats: &mut RunStats,
    pb: &ProgressBar,
) -> Result<RunOutcome, HarvestError>
where
    B: Browser + ?Sized,
    F: Fetcher + ?Sized,
{
    let mut iterations: u64 = 0;
    // Set when the last advance did not move, so the photo is not processed twice.
    let mut handled_current = false;

    loop {
        if cancel.is_cancelled() {
            tracing::info!("Shutdown requested, stopping traversal");
            return Ok(RunOutcome::Cancelled);
        }
        if iterations >= config.max_photos {
            tracing::warn!("Stopped after {} photos without returning to the first one", iterations);
            return Ok(RunOutcome::LimitReached);
        }
        iterations += 1;

        if !handled_current {
            let url = cursor.current_url().to_string();
            if album::is_video_url(&url) {
                stats.videos_skipped += 1;
                pb.suspend(|| tracing::info!("Skipping video {}", url));
            } else {
                pb.set_message(cursor.current_photo_id().to_string());
                stats.attempted += 1;
                if process_photo(browser, fetcher, config, stats, pb, &url).await? {
                    return Ok(RunOutcome::Blocked);
                }
                pb.inc(1);
            }
        }

        match cursor.advance(browser, config.delay).await? {
            Advance::Moved => handled_current = false,
            Advance::CycleClosed => {
                pb.suspend(|| {
                    tracing::info!(
                        steps = cursor.visited_count(),
                        first_photo = cursor.sentinel_photo_id().unwrap_or_default(),
                        "Back at the first photo, album complete"
                    )
                });
                return Ok(RunOutcome::Done);
            }
            Advance::NoBody => {
                stats.anomalies += 1;
                handled_current = true;
                pb.suspend(|| tracing::warn!("No page body at {}, retrying", cursor.current_url()));
                tokio::time::sleep(config.delay).await;
            }
        }
    }
}

/// Extract and download the photo at `url`. Returns true if the site is
/// throttling the account. Only a lost browser session is an error.
async fn process_photo<B, F>(
    browser: &B,
    fetcher: &F,
    config: &HarvestConfig,
    stats: &mut RunStats,
    pb: &ProgressBar,
    url: &str,
) -> Result<bool, HarvestError>
where
    B: Browser + ?Sized,
    F: Fetcher + ?Sized,
{
    let photo = match extract::extract_photo(browser).await {
        Ok(Extraction::Photo(photo)) => photo,
        Ok(Extraction::Blocked) => {
            pb.suspend(|| tracing::error!("Temporarily blocked while viewing {}", url));
            return Ok(true);
        }
        Ok(Extraction::NoImage) => {
            stats.failed += 1;
            pb.suspend(|| tracing::error!("No image metadata found at {}", url));
            return Ok(false);
        }
        Err(ExtractError::Browser(e)) if e.is_session_lost() => return Err(e.into()),
        Err(ExtractError::Browser(e)) => {
            stats.failed += 1;
            pb.suspend(|| tracing::error!("Browser error while reading {}: {}", url, e));
            return Ok(false);
        }
        Err(e @ ExtractError::MalformedMarkup { .. }) => {
            stats.failed += 1;
            pb.suspend(|| tracing::error!("{} ({})", e, url));
            return Ok(false);
        }
    };

    match download::download_photo(fetcher, &config.download, &photo).await {
        DownloadOutcome::Downloaded => stats.downloaded += 1,
        DownloadOutcome::AlreadyPresent => stats.already_present += 1,
        DownloadOutcome::WouldDownload => stats.would_download += 1,
        DownloadOutcome::Failed => stats.failed += 1,
    }
    Ok(false)
}

/// Spinner for traversal, which has no known length. Hidden when the user
/// passed `--no-progress-bar` or stdout is not a TTY.
fn create_spinner(no_progress_bar: bool) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {pos} photos {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
