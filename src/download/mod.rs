//! Idempotent photo download: deterministic path, skip if present, fetch,
//! then stamp the file with the photo's creation time.

pub mod error;
pub mod file;
pub mod paths;

use std::fs::FileTimes;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use file::{Fetcher, HttpFetcher};

use crate::extract::PhotoMetadata;
use crate::types::AlbumKind;

/// Subset of application config consumed by the downloader.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub(crate) directory: PathBuf,
    pub(crate) account: String,
    pub(crate) album: AlbumKind,
    pub(crate) dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded,
    AlreadyPresent,
    /// Dry run: the file is missing and would have been fetched.
    WouldDownload,
    Failed,
}

/// Save one photo under the configured directory unless it is already there.
///
/// Failures are logged and reported as [`DownloadOutcome::Failed`]; they never
/// abort the caller's traversal.
pub async fn download_photo<F>(
    fetcher: &F,
    config: &DownloadConfig,
    photo: &PhotoMetadata,
) -> DownloadOutcome
where
    F: Fetcher + ?Sized,
{
    let path = paths::local_download_path(&config.directory, photo, config.album, &config.account);

    if path.is_file() {
        tracing::info!("Photo {} already downloaded", photo.photo_id);
        return DownloadOutcome::AlreadyPresent;
    }
    if config.dry_run {
        tracing::info!("[DRY RUN] Would download {}", path.display());
        return DownloadOutcome::WouldDownload;
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.directory).await {
        tracing::error!(
            "Could not create directory {}: {}",
            config.directory.display(),
            e
        );
        return DownloadOutcome::Failed;
    }

    tracing::info!("Downloading {}", photo.uri);
    if let Err(e) = fetcher.fetch(&photo.uri, &path).await {
        tracing::error!("Failed to download photo {}: {}", photo.photo_id, e);
        return DownloadOutcome::Failed;
    }

    let stamped = path.clone();
    let ts = photo.created_time();
    match tokio::task::spawn_blocking(move || set_file_times(&stamped, ts)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Could not set file times on {}: {}", path.display(), e),
        Err(e) => tracing::warn!("File time task failed for {}: {}", path.display(), e),
    }

    tracing::debug!("Saved {}", path.display());
    DownloadOutcome::Downloaded
}

/// Set both access and modification time to `timestamp` (Unix seconds).
fn set_file_times(path: &Path, timestamp: i64) -> std::io::Result<()> {
    let time = if timestamp >= 0 {
        UNIX_EPOCH + Duration::from_secs(timestamp as u64)
    } else {
        UNIX_EPOCH
            .checked_sub(Duration::from_secs(timestamp.unsigned_abs()))
            .unwrap_or(SystemTime::UNIX_EPOCH)
    };
    let times = FileTimes::new().set_modified(time).set_accessed(time);
    let file = std::fs::File::options().write(true).open(path)?;
    file.set_times(times)
}
