use clap::Parser;

use crate::types::{AlbumKind, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "fbpd-rs",
    version,
    about = "Download the photos of a Facebook album through a real browser"
)]
pub struct Cli {
    /// Login email address
    #[arg(short = 'e', long, env = "FB_EMAIL")]
    pub email: String,

    /// Login password (if not provided, will prompt).
    /// WARNING: passing via --password is visible in process listings.
    /// Prefer the FB_PASSWORD environment variable instead.
    #[arg(short = 'p', long, env = "FB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Album to download: photos the account is tagged in, or uploaded by it
    #[arg(short = 'a', long, value_enum, default_value = "of")]
    pub album: AlbumKind,

    /// Account whose album is downloaded
    #[arg(short = 'u', long, default_value = "me")]
    pub username: String,

    /// Seconds to wait for the viewer after moving to the next photo.
    /// Raise this if the account gets temporarily blocked.
    #[arg(short = 't', long, visible_alias = "delay", default_value_t = 2.0)]
    pub timeout: f64,

    /// Local directory for downloads
    #[arg(short = 'd', long, default_value = "photos")]
    pub directory: String,

    /// WebDriver server to drive the browser through
    #[arg(long, default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many photos if the album never loops back
    #[arg(long, default_value_t = 50_000)]
    pub max_photos: u64,

    /// Max retries per image fetch (0 = no retries)
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Initial delay in seconds before the first retry (doubles each retry)
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// Walk the album and log target paths without downloading
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress_bar: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
