use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::error::DownloadError;
use super::paths::part_path;
use crate::retry::{with_retries, RetryConfig};

/// Fetches an image URL into a local file.
///
/// Implementations must not leave anything at `destination` unless the whole
/// body was written.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), DownloadError>;
}

/// Plain HTTP GET with no cookies; image URLs are pre-signed.
pub struct HttpFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpFetcher {
    pub fn new(retry: RetryConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, retry })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Stream the body into a `.part` file next to `destination`, then rename
    /// it into place. Each attempt starts from an empty `.part` file.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), DownloadError> {
        let part = part_path(destination);
        let client = &self.client;
        let part_ref = part.as_path();

        let result = with_retries(&self.retry, |attempt| async move {
            if attempt > 0 {
                tracing::debug!(url, attempt, "Retrying image fetch");
            }
            let _ = fs::remove_file(part_ref).await;
            attempt_fetch(client, url, destination, part_ref).await
        })
        .await;

        if result.is_err() {
            let _ = fs::remove_file(&part).await;
        }
        result
    }
}

async fn attempt_fetch(
    client: &Client,
    url: &str,
    destination: &Path,
    part: &Path,
) -> Result<(), DownloadError> {
    let http_err = |source| DownloadError::Http {
        source,
        url: url.to_string(),
    };

    let response = client.get(url).send().await.map_err(http_err)?;
    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part)
        .await?;

    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::warn!("Body read failed for {} after {} bytes: {}", url, bytes_written, e);
            http_err(e)
        })?;
        file.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    fs::rename(part, destination).await?;
    tracing::debug!(bytes_written, "Wrote {}", destination.display());
    Ok(())
}
