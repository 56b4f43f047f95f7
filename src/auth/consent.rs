use crate::browser::{safe_click, Browser, BrowserError, Locator};

/// Known cookie-consent buttons, most permissive first. The site ships many
/// variants and they change without notice.
const CONSENT_BUTTONS: &[Locator] = &[
    Locator::XPath("//button[contains(., 'Allow all cookies')]"),
    Locator::XPath("//button[contains(., 'Only allow essential cookies')]"),
    Locator::XPath("//button[contains(., 'Decline optional cookies')]"),
    Locator::XPath("//div[@role='dialog']//button[contains(., 'Decline')]"),
    Locator::XPath("//div[@role='dialog']//button[contains(., 'Allow all')]"),
];

/// Best-effort dismissal of a cookie-consent dialog.
///
/// Returns `true` once a candidate button was clicked. No dialog is the
/// common case and yields `false`.
pub async fn dismiss_consent_dialog<B>(browser: &B) -> Result<bool, BrowserError>
where
    B: Browser + ?Sized,
{
    for &locator in CONSENT_BUTTONS {
        let Some(button) = browser.find(locator).await? else {
            continue;
        };
        if safe_click(browser, Some(&button)).await {
            tracing::debug!(?locator, "Dismissed cookie dialog");
            return Ok(true);
        }
    }
    Ok(false)
}
