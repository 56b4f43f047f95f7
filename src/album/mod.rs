//! Album discovery and forward traversal through the photo viewer.
//!
//! The viewer has no "end of album": pressing the right arrow on the last
//! photo wraps around to the first. Traversal therefore remembers the first
//! real photo it saw (the sentinel) and stops when the viewer comes back to it.

mod error;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

pub use error::AlbumError;

use crate::auth::Session;
use crate::browser::{first_present, Browser, BrowserError, Locator, ARROW_RIGHT, BODY};
use crate::endpoints::{photos_for_profile_url, Endpoints};
use crate::types::AlbumKind;

/// Links into the photo viewer from an album grid, most specific first.
const PHOTO_LINKS: &[Locator] = &[
    Locator::Css("a[href*='photo.php']"),
    Locator::XPath("//a[contains(@href,'photo.php')]"),
    Locator::XPath("//a[starts-with(@href,'/photo')]"),
];
const PHOTO_LINK_TIMEOUT: Duration = Duration::from_secs(5);
const VIDEO_MARKER: &str = "videos";

static PHOTO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fbid=(?P<pid>\d+)&").expect("valid regex"));

/// Photo id embedded in a viewer URL, or an empty string if there is none.
pub fn photo_id_from_url(url: &str) -> String {
    PHOTO_ID_RE
        .captures(url)
        .map(|c| c["pid"].to_string())
        .unwrap_or_default()
}

pub fn is_video_url(url: &str) -> bool {
    url.contains(VIDEO_MARKER)
}

/// Result of one forward step in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    /// The viewer is back on the sentinel photo.
    CycleClosed,
    /// The page had no body to send the arrow key to. Nothing moved.
    NoBody,
}

/// Position of a traversal in the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumCursor {
    current_url: String,
    current_photo_id: String,
    sentinel_photo_id: Option<String>,
    visited_count: u64,
}

impl AlbumCursor {
    fn start(url: String) -> Self {
        let mut cursor = Self {
            current_photo_id: photo_id_from_url(&url),
            current_url: url,
            sentinel_photo_id: None,
            visited_count: 0,
        };
        cursor.observe();
        cursor
    }

    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    pub fn current_photo_id(&self) -> &str {
        &self.current_photo_id
    }

    pub fn sentinel_photo_id(&self) -> Option<&str> {
        self.sentinel_photo_id.as_deref()
    }

    /// Forward steps taken so far.
    pub fn visited_count(&self) -> u64 {
        self.visited_count
    }

    /// Record the current position. Returns true if it closes the cycle.
    ///
    /// Only a non-video URL with a photo id can become the sentinel or match
    /// it.
    fn observe(&mut self) -> bool {
        if is_video_url(&self.current_url) || self.current_photo_id.is_empty() {
            return false;
        }
        match &self.sentinel_photo_id {
            Some(sentinel) => *sentinel == self.current_photo_id,
            None => {
                tracing::debug!(photo_id = %self.current_photo_id, "Sentinel photo set");
                self.sentinel_photo_id = Some(self.current_photo_id.clone());
                false
            }
        }
    }

    /// Press the right arrow, wait `delay` for the viewer to settle, then read
    /// where it landed.
    pub async fn advance<B>(&mut self, browser: &B, delay: Duration) -> Result<Advance, BrowserError>
    where
        B: Browser + ?Sized,
    {
        let Some(body) = browser.find(BODY).await? else {
            return Ok(Advance::NoBody);
        };
        browser.send_keys(&body, ARROW_RIGHT).await?;
        tokio::time::sleep(delay).await;

        self.current_url = browser.current_url().await?;
        self.current_photo_id = photo_id_from_url(&self.current_url);
        self.visited_count += 1;

        if self.observe() {
            Ok(Advance::CycleClosed)
        } else {
            Ok(Advance::Moved)
        }
    }
}

/// Navigate from the account's profile to the requested album and open its
/// first photo in the viewer.
///
/// Returns `None` when the album has no photo link, which is how a missing or
/// empty album looks.
pub async fn open_album<B>(
    browser: &B,
    session: &Session,
    endpoints: &Endpoints,
    account: &str,
    kind: AlbumKind,
) -> Result<Option<AlbumCursor>, AlbumError>
where
    B: Browser + ?Sized,
{
    if !session.is_authenticated() {
        return Err(AlbumError::NotAuthenticated);
    }

    tracing::info!("Going to the profile page of {}", account);
    browser.goto(&endpoints.profile(account)).await?;

    let profile_url = browser.current_url().await?;
    let photos_url = if profile_url.contains("profile.php") {
        photos_for_profile_url(&profile_url)
    } else {
        endpoints.photos(account)
    };
    browser.goto(&photos_url).await?;

    let album_url = format!("{}_{}", photos_url, kind.as_str());
    tracing::debug!(album_url, "Opening album");
    browser.goto(&album_url).await?;

    let Some(link) = first_present(browser, PHOTO_LINKS, PHOTO_LINK_TIMEOUT).await? else {
        return Ok(None);
    };
    let Some(href) = browser
        .attribute(&link, "href")
        .await?
        .filter(|href| !href.is_empty())
    else {
        return Ok(None);
    };

    browser.goto(&endpoints.absolute(&href)).await?;
    let cursor = AlbumCursor::start(browser.current_url().await?);
    tracing::info!(photo_id = %cursor.current_photo_id, "Opened first photo");
    Ok(Some(cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeBrowser, FakePage};

    const BASE: &str = "https://fb.test";

    fn photo_url(id: &str) -> String {
        format!("{}/photo.php?fbid={}&set=t.1&type=3", BASE, id)
    }

    fn video_url(id: &str) -> String {
        format!("{}/jane/videos/{}/", BASE, id)
    }

    fn album_page(href: &str) -> FakePage {
        FakePage::new()
            .with_element(PHOTO_LINKS[0], "first")
            .with_attribute("first", "href", href)
    }

    fn session() -> Session {
        Session::authenticated_for_tests()
    }

    #[test]
    fn test_photo_id_from_url() {
        assert_eq!(photo_id_from_url(&photo_url("10150")), "10150");
        assert_eq!(
            photo_id_from_url("https://fb.test/photo/?fbid=77&set=a.1"),
            "77"
        );
        // The id must be followed by another query parameter.
        assert_eq!(photo_id_from_url("https://fb.test/photo.php?fbid=77"), "");
        assert_eq!(photo_id_from_url(&video_url("5")), "");
    }

    #[test]
    fn test_is_video_url() {
        assert!(is_video_url(&video_url("5")));
        assert!(!is_video_url(&photo_url("5")));
    }

    #[tokio::test]
    async fn test_open_album_vanity_profile() {
        let first = photo_url("100");
        let browser = FakeBrowser::new(BASE)
            .page(&format!("{}/jane/photos_of", BASE), album_page(&first));
        let cursor = open_album(
            &browser,
            &session(),
            &Endpoints::new(BASE),
            "jane",
            AlbumKind::TaggedIn,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(cursor.current_url(), first);
        assert_eq!(cursor.current_photo_id(), "100");
        assert_eq!(cursor.sentinel_photo_id(), Some("100"));
        assert_eq!(cursor.visited_count(), 0);
        assert_eq!(
            browser.log(),
            vec![
                "goto:https://fb.test/jane".to_string(),
                "goto:https://fb.test/jane/photos".to_string(),
                "goto:https://fb.test/jane/photos_of".to_string(),
                format!("goto:{}", first),
            ]
        );
    }

    #[tokio::test]
    async fn test_open_album_numeric_profile() {
        let profile = format!("{}/profile.php?id=42", BASE);
        let album = format!("{}&sk=photos_by", profile);
        let browser = FakeBrowser::new(BASE)
            .redirect(&format!("{}/42", BASE), &profile)
            .page(&album, album_page(&photo_url("7")));
        let cursor = open_album(
            &browser,
            &session(),
            &Endpoints::new(BASE),
            "42",
            AlbumKind::UploadedBy,
        )
        .await
        .unwrap();

        assert!(cursor.is_some());
        assert!(browser.log().contains(&format!("goto:{}", album)));
    }

    #[tokio::test]
    async fn test_open_album_resolves_relative_link() {
        let browser = FakeBrowser::new(BASE).page(
            &format!("{}/jane/photos_of", BASE),
            album_page("/photo/?fbid=31&set=a.2"),
        );
        let cursor = open_album(
            &browser,
            &session(),
            &Endpoints::new(BASE),
            "jane",
            AlbumKind::TaggedIn,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(cursor.current_url(), "https://fb.test/photo/?fbid=31&set=a.2");
        assert_eq!(cursor.current_photo_id(), "31");
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_album_not_found() {
        let browser = FakeBrowser::new(BASE);
        let cursor = open_album(
            &browser,
            &session(),
            &Endpoints::new(BASE),
            "jane",
            AlbumKind::TaggedIn,
        )
        .await
        .unwrap();
        assert!(cursor.is_none());
    }

    #[tokio::test]
    async fn test_open_album_requires_authenticated_session() {
        let browser = FakeBrowser::new(BASE);
        let result = open_album(
            &browser,
            &Session::default(),
            &Endpoints::new(BASE),
            "jane",
            AlbumKind::TaggedIn,
        )
        .await;
        assert!(matches!(result, Err(AlbumError::NotAuthenticated)));
        assert!(browser.log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_closes_cycle_on_sentinel() {
        let ring: Vec<String> = ["100", "101", "102"].iter().map(|id| photo_url(id)).collect();
        let browser = FakeBrowser::new(&ring[0]).album_ring(&ring);
        let mut cursor = AlbumCursor::start(ring[0].clone());
        let delay = Duration::from_secs(2);

        assert_eq!(cursor.advance(&browser, delay).await.unwrap(), Advance::Moved);
        assert_eq!(cursor.current_photo_id(), "101");
        assert_eq!(cursor.advance(&browser, delay).await.unwrap(), Advance::Moved);
        assert_eq!(
            cursor.advance(&browser, delay).await.unwrap(),
            Advance::CycleClosed
        );
        assert_eq!(cursor.current_photo_id(), "100");
        assert_eq!(cursor.visited_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_never_becomes_sentinel() {
        let ring = vec![video_url("9"), photo_url("100"), photo_url("101")];
        let browser = FakeBrowser::new(&ring[0]).album_ring(&ring);
        let mut cursor = AlbumCursor::start(ring[0].clone());
        assert_eq!(cursor.sentinel_photo_id(), None);

        let delay = Duration::from_millis(10);
        assert_eq!(cursor.advance(&browser, delay).await.unwrap(), Advance::Moved);
        assert_eq!(cursor.sentinel_photo_id(), Some("100"));
        assert_eq!(cursor.advance(&browser, delay).await.unwrap(), Advance::Moved);
        // Wrapping onto the video does not close the cycle.
        assert_eq!(cursor.advance(&browser, delay).await.unwrap(), Advance::Moved);
        assert_eq!(
            cursor.advance(&browser, delay).await.unwrap(),
            Advance::CycleClosed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_photo_album_closes_immediately() {
        let ring = vec![photo_url("100")];
        let browser = FakeBrowser::new(&ring[0]).album_ring(&ring);
        let mut cursor = AlbumCursor::start(ring[0].clone());
        assert_eq!(
            cursor.advance(&browser, Duration::ZERO).await.unwrap(),
            Advance::CycleClosed
        );
    }

    #[tokio::test]
    async fn test_advance_without_body() {
        let url = photo_url("100");
        let browser = FakeBrowser::new(&url).page(&url, FakePage::new().without_body());
        let mut cursor = AlbumCursor::start(url.clone());
        assert_eq!(
            cursor.advance(&browser, Duration::ZERO).await.unwrap(),
            Advance::NoBody
        );
        assert_eq!(cursor.current_url(), url);
        assert_eq!(cursor.visited_count(), 0);
    }
}
