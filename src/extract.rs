//! Photo metadata extraction from the photo viewer page.
//!
//! The viewer embeds a JSON blob in a `<script>` tag. Its surrounding structure
//! changes often, so only a few stable keys are pattern-matched out of the raw
//! text instead of parsing the whole document.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use thiserror::Error;

use crate::browser::{Browser, BrowserError, Locator};

/// Phrase shown when the site throttles automated browsing.
pub const BLOCK_NOTICE: &str = "Temporarily Blocked";

pub(crate) const IMAGE_SCRIPT: Locator =
    Locator::XPath(r#"//script[contains(text(), 'image":{"uri')]"#);

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""image":\{"uri":"(?P<uri>.*?)""#).expect("valid regex"));
static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<photo_id>\w+)\.(?P<ext>\w+)\?").expect("valid regex"));
static CREATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""created_time":(?P<ts>\d+)"#).expect("valid regex"));

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The metadata block exists but a required key could not be matched.
    #[error("Malformed photo metadata: no {field} found; page markup may have changed")]
    MalformedMarkup { field: &'static str },

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMetadata {
    /// Absolute image URL with JSON escaping removed.
    pub uri: String,
    pub photo_id: String,
    pub extension: String,
    pub created: DateTime<Utc>,
}

impl PhotoMetadata {
    /// Creation time as Unix seconds.
    pub fn created_time(&self) -> i64 {
        self.created.timestamp()
    }

    /// `YYYYMMDD` of the creation time in UTC.
    pub fn date_stamp(&self) -> String {
        self.created.format("%Y%m%d").to_string()
    }
}

/// What the current photo page yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Photo(PhotoMetadata),
    /// The site is throttling this account. Ends the run.
    Blocked,
    /// No image metadata on the page.
    NoImage,
}

/// Extract metadata for the photo currently shown in the viewer.
///
/// The page is reloaded first so the metadata matches the current URL rather
/// than whatever the viewer rendered client-side. A block notice wins over
/// image metadata present on the same page.
pub async fn extract_photo<B>(browser: &B) -> Result<Extraction, ExtractError>
where
    B: Browser + ?Sized,
{
    browser.reload().await?;

    if browser.source().await?.contains(BLOCK_NOTICE) {
        return Ok(Extraction::Blocked);
    }

    let Some(script) = browser.find(IMAGE_SCRIPT).await? else {
        return Ok(Extraction::NoImage);
    };
    let text = browser
        .attribute(&script, "innerHTML")
        .await?
        .unwrap_or_default();
    Ok(Extraction::Photo(parse_metadata(&text)?))
}

/// Parse the image URL, photo id, extension and creation time out of the raw
/// metadata script text.
pub fn parse_metadata(script: &str) -> Result<PhotoMetadata, ExtractError> {
    let uri = URI_RE
        .captures(script)
        .map(|c| c["uri"].replace('\\', ""))
        .ok_or(ExtractError::MalformedMarkup { field: "image uri" })?;

    let file = FILENAME_RE
        .captures(&uri)
        .ok_or(ExtractError::MalformedMarkup {
            field: "image filename",
        })?;
    let photo_id = file["photo_id"].to_string();
    let extension = file["ext"].to_string();

    let created = CREATED_RE
        .captures(script)
        .and_then(|c| c["ts"].parse::<i64>().ok())
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .ok_or(ExtractError::MalformedMarkup {
            field: "created_time",
        })?;

    Ok(PhotoMetadata {
        uri,
        photo_id,
        extension,
        created,
    })
}
