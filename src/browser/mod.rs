//! Browser capability consumed by the session, navigation and extraction code.
//!
//! Everything above this module talks to a [`Browser`] rather than to a
//! WebDriver client directly, so flows can run against [`fake::FakeBrowser`]
//! in tests. The production implementation lives in [`webdriver`].

pub mod error;
#[cfg(test)]
pub mod fake;
pub mod interact;
pub mod locate;
pub mod webdriver;

pub use self::error::BrowserError;
pub use self::interact::safe_click;
pub use self::locate::first_present;

/// WebDriver code point for the right arrow key.
pub const ARROW_RIGHT: &str = "\u{E014}";
/// WebDriver code point for the Enter key.
pub const ENTER: &str = "\u{E007}";

/// Element descriptor. All descriptors used by the crate are compile-time
/// constants, hence the `'static` borrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(&'static str),
    Name(&'static str),
    Css(&'static str),
    XPath(&'static str),
}

/// Locator for the page body, the target of synthetic navigation keys.
pub const BODY: Locator = Locator::XPath("/html/body");

#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    type Element: Clone + Send + Sync;

    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Full markup of the current page.
    async fn source(&self) -> Result<String, BrowserError>;

    /// Look up a single element. Absence is `Ok(None)`, never an error.
    async fn find(&self, locator: Locator) -> Result<Option<Self::Element>, BrowserError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    async fn send_keys(&self, element: &Self::Element, keys: &str) -> Result<(), BrowserError>;

    async fn clear(&self, element: &Self::Element) -> Result<(), BrowserError>;

    async fn click(&self, element: &Self::Element) -> Result<(), BrowserError>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, BrowserError>;

    /// Run `script` with `element` bound to `arguments[0]`.
    async fn execute(&self, script: &str, element: &Self::Element) -> Result<(), BrowserError>;

    /// Re-navigate to the current location so subsequent reads see fresh content.
    async fn reload(&self) -> Result<(), BrowserError> {
        let url = self.current_url().await?;
        self.goto(&url).await
    }
}
