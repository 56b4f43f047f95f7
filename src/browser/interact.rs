use std::time::Duration;

use super::{Browser, BrowserError};

const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView({block: 'center'});";
const SCRIPT_CLICK: &str = "arguments[0].click();";

/// Pause after scrolling so the layout can settle before the retry.
const SCROLL_SETTLE: Duration = Duration::from_millis(300);

/// Click `element`, degrading gracefully when something covers it.
///
/// Direct click first; if intercepted, scroll the element to the viewport
/// centre and retry; if still intercepted, click from script, bypassing hit
/// testing. Returns `false` for an absent element or any other failure.
pub async fn safe_click<B>(browser: &B, element: Option<&B::Element>) -> bool
where
    B: Browser + ?Sized,
{
    let Some(element) = element else {
        return false;
    };

    match browser.click(element).await {
        Ok(()) => return true,
        Err(BrowserError::ClickIntercepted) => {}
        Err(e) => {
            tracing::debug!(error = %e, "click failed");
            return false;
        }
    }

    tracing::debug!("click intercepted, scrolling element into view");
    if let Err(e) = browser.execute(SCROLL_INTO_VIEW, element).await {
        tracing::debug!(error = %e, "scroll into view failed");
        return false;
    }
    tokio::time::sleep(SCROLL_SETTLE).await;

    match browser.click(element).await {
        Ok(()) => true,
        Err(BrowserError::ClickIntercepted) => match browser.execute(SCRIPT_CLICK, element).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "script click failed");
                false
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "click retry failed");
            false
        }
    }
}
