//! [`Browser`] backed by a WebDriver session (chromedriver, geckodriver, ...).

use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;

use super::{Browser, BrowserError, Locator};

/// Classified by W3C error status; driver message wording varies per browser.
impl From<CmdError> for BrowserError {
    fn from(e: CmdError) -> Self {
        match &e {
            CmdError::Standard(w) if w.error == ErrorStatus::ElementClickIntercepted => {
                BrowserError::ClickIntercepted
            }
            _ if e.is_stale_element_reference() => BrowserError::StaleElement,
            CmdError::Standard(w) if w.error == ErrorStatus::InvalidSessionId => {
                BrowserError::Session(e.to_string())
            }
            CmdError::Lost(_) => BrowserError::Session(e.to_string()),
            _ => BrowserError::Command(e.to_string()),
        }
    }
}

pub struct WebDriverBrowser {
    client: Client,
}

impl std::fmt::Debug for WebDriverBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverBrowser").finish_non_exhaustive()
    }
}

impl WebDriverBrowser {
    /// Open a new browser session on the WebDriver server at `webdriver_url`.
    ///
    /// Notification permission prompts are denied up front; they would
    /// otherwise cover the photo viewer.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, BrowserError> {
        let mut args = vec!["--disable-infobars", "--disable-extensions"];
        if headless {
            args.push("--headless=new");
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "prefs": {
                    "profile.default_content_setting_values.notifications": 2,
                },
            }),
        );

        tracing::debug!(webdriver_url, headless, "Starting WebDriver session");
        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;
        Ok(Self { client })
    }

    /// End the WebDriver session, closing the browser window.
    pub async fn close(self) -> Result<(), BrowserError> {
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn source(&self) -> Result<String, BrowserError> {
        Ok(self.client.source().await?)
    }

    async fn find(&self, locator: Locator) -> Result<Option<Element>, BrowserError> {
        let name_selector;
        let locator = match locator {
            Locator::Id(id) => fantoccini::Locator::Id(id),
            Locator::Css(css) => fantoccini::Locator::Css(css),
            Locator::XPath(xpath) => fantoccini::Locator::XPath(xpath),
            Locator::Name(name) => {
                name_selector = format!("[name='{}']", name);
                fantoccini::Locator::Css(&name_selector)
            }
        };
        match self.client.find(locator).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, BrowserError> {
        // Properties such as innerHTML are not exposed as attributes.
        match element.attr(name).await? {
            Some(value) => Ok(Some(value)),
            None => Ok(element.prop(name).await?),
        }
    }

    async fn send_keys(&self, element: &Element, keys: &str) -> Result<(), BrowserError> {
        element.send_keys(keys).await?;
        Ok(())
    }

    async fn clear(&self, element: &Element) -> Result<(), BrowserError> {
        element.clear().await?;
        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<(), BrowserError> {
        element.click().await?;
        Ok(())
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool, BrowserError> {
        Ok(element.is_displayed().await? && element.is_enabled().await?)
    }

    async fn execute(&self, script: &str, element: &Element) -> Result<(), BrowserError> {
        let arg = serde_json::to_value(element)
            .map_err(|e| BrowserError::Command(format!("cannot pass element to script: {}", e)))?;
        self.client.execute(script, vec![arg]).await?;
        Ok(())
    }
}
