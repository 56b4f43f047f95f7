//! fbpd-rs: download every photo of a Facebook album.
//!
//! The album is walked in a real browser over WebDriver: log in (with an
//! operator completing two-step verification when asked), open the tagged-in
//! or uploaded-by album, then page through the photo viewer until it loops back
//! to the first photo. Each photo is saved under a deterministic, date-prefixed
//! name, so interrupted runs can simply be restarted.

#![warn(clippy::all)]

mod album;
mod auth;
mod browser;
mod cli;
mod config;
mod download;
mod endpoints;
mod extract;
mod harvest;
mod retry;
mod shutdown;
mod types;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use auth::Credentials;
use browser::webdriver::WebDriverBrowser;
use download::{DownloadConfig, HttpFetcher};
use endpoints::Endpoints;
use harvest::{HarvestConfig, RunOutcome};
use retry::RetryConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::debug!(?config, "Resolved configuration");

    let password = match config.password.clone() {
        Some(p) => p,
        None => tokio::task::spawn_blocking(|| rpassword::prompt_password("Facebook password: "))
            .await?
            .context("Failed to read password")?,
    };

    let harvest_config = HarvestConfig {
        endpoints: Endpoints::default(),
        credentials: Credentials {
            email: config.email.clone(),
            password,
        },
        account: config.account.clone(),
        album: config.album,
        delay: config.delay,
        max_photos: config.max_photos,
        download: DownloadConfig {
            directory: config.directory.clone(),
            account: config.account.clone(),
            album: config.album,
            dry_run: config.dry_run,
        },
        no_progress_bar: config.no_progress_bar,
    };

    let fetcher = HttpFetcher::new(RetryConfig {
        max_retries: config.max_retries,
        base_delay: Duration::from_secs(config.retry_delay_secs),
        ..RetryConfig::default()
    })?;

    let cancel = shutdown::install_signal_handler();
    let (mut gate, operator) = auth::operator_channel(cancel.clone());
    let operator_task = auth::spawn_stdin_operator(operator);

    let browser = WebDriverBrowser::connect(&config.webdriver_url, config.headless)
        .await
        .with_context(|| {
            format!(
                "Could not start a browser session; is a WebDriver server running at {}?",
                config.webdriver_url
            )
        })?;

    let result = harvest::run(&browser, &fetcher, &mut gate, &harvest_config, &cancel).await;

    // The session must be closed on every exit path or the browser window lingers.
    if let Err(e) = browser.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }
    operator_task.abort();

    let report = result?;
    tracing::info!("{}", report);
    let stats = &report.stats;
    tracing::info!(
        failed = stats.failed,
        videos_skipped = stats.videos_skipped,
        missing_body = stats.anomalies,
        would_download = stats.would_download,
        "Run finished"
    );
    match report.outcome {
        RunOutcome::Done | RunOutcome::Cancelled | RunOutcome::LimitReached => Ok(()),
        RunOutcome::AlbumNotFound => Ok(()),
        RunOutcome::Blocked => anyhow::bail!(
            "Facebook temporarily blocked this account. Wait a while, then retry with a \
             longer --timeout (currently {:.1}s)",
            config.delay.as_secs_f64()
        ),
    }
}
