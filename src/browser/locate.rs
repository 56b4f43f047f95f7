use std::time::Duration;

use tokio::time::Instant;

use super::{Browser, BrowserError, Locator};

/// Interval between passes over the locator list while polling.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Return the element matched by the first locator in `locators` that is
/// present on the page.
///
/// With a zero `timeout` this makes exactly one pass over the list. Otherwise
/// the whole list is re-checked every [`POLL_INTERVAL`] until an element shows
/// up or the deadline passes. List order is priority order: an earlier locator
/// wins even when a later one would also match.
pub async fn first_present<B>(
    browser: &B,
    locators: &[Locator],
    timeout: Duration,
) -> Result<Option<B::Element>, BrowserError>
where
    B: Browser + ?Sized,
{
    let deadline = Instant::now() + timeout;
    loop {
        for &locator in locators {
            if let Some(element) = browser.find(locator).await? {
                return Ok(Some(element));
            }
        }
        if timeout.is_zero() || Instant::now() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
