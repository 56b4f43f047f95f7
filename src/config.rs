use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;

use crate::types::{AlbumKind, LogLevel};

/// Application configuration resolved from the command line.
pub struct Config {
    pub email: String,
    pub password: Option<String>,
    pub account: String,
    pub directory: PathBuf,
    pub webdriver_url: String,
    pub delay: Duration,
    pub max_photos: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub album: AlbumKind,
    #[allow(dead_code)] // read from cli.log_level directly in main.rs
    pub log_level: LogLevel,
    pub headless: bool,
    pub dry_run: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("account", &self.account)
            .field("album", &self.album)
            .field("directory", &self.directory)
            .field("delay", &self.delay)
            .field("webdriver_url", &self.webdriver_url)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        if !cli.timeout.is_finite() || cli.timeout < 0.0 {
            bail!("--timeout must be a non-negative number of seconds");
        }
        if cli.username.trim().is_empty() {
            bail!("--username must not be empty");
        }

        Ok(Self {
            email: cli.email,
            password: cli.password,
            account: cli.username,
            directory: expand_tilde(&cli.directory),
            webdriver_url: cli.webdriver_url,
            delay: Duration::from_secs_f64(cli.timeout),
            max_photos: cli.max_photos,
            max_retries: cli.max_retries,
            retry_delay_secs: cli.retry_delay,
            album: cli.album,
            log_level: cli.log_level,
            headless: cli.headless,
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
        })
    }
}
