//! Scripted in-memory browser for tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use super::{Browser, BrowserError, Locator, ARROW_RIGHT, BODY, ENTER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement(pub String);

/// Content served for one URL.
#[derive(Debug, Default, Clone)]
pub struct FakePage {
    source: String,
    elements: Vec<(Locator, String)>,
    attributes: HashMap<(String, String), String>,
    on_click: HashMap<String, String>,
    disabled: HashSet<String>,
    no_body: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_element(mut self, locator: Locator, id: &str) -> Self {
        self.elements.push((locator, id.to_string()));
        self
    }

    pub fn with_attribute(mut self, id: &str, name: &str, value: impl Into<String>) -> Self {
        self.attributes
            .insert((id.to_string(), name.to_string()), value.into());
        self
    }

    /// Clicking element `id` (directly or from script) navigates to `url`.
    pub fn navigates_on_click(mut self, id: &str, url: &str) -> Self {
        self.on_click.insert(id.to_string(), url.to_string());
        self
    }

    pub fn with_disabled(mut self, id: &str) -> Self {
        self.disabled.insert(id.to_string());
        self
    }

    pub fn without_body(mut self) -> Self {
        self.no_body = true;
        self
    }
}

#[derive(Default)]
struct Inner {
    current_url: String,
    pages: HashMap<String, FakePage>,
    redirects: HashMap<String, String>,
    ring: Vec<String>,
    on_enter: HashMap<String, String>,
    click_errors: HashMap<String, VecDeque<BrowserError>>,
    read_errors: HashMap<String, VecDeque<BrowserError>>,
    enabled_after: HashMap<String, usize>,
    appear_after: HashMap<Locator, usize>,
    find_count: usize,
    log: Vec<String>,
}

impl Inner {
    fn page(&self) -> FakePage {
        self.pages
            .get(&self.current_url)
            .cloned()
            .unwrap_or_default()
    }

    fn navigate(&mut self, url: &str) {
        self.current_url = self
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
    }

    fn apply_click(&mut self, id: &str) {
        if let Some(target) = self.page().on_click.get(id) {
            self.current_url = target.clone();
        }
    }
}

/// In-memory [`Browser`] driven by pages registered up front.
///
/// Pressing the right arrow on the body while on a URL in the album ring moves
/// to the next URL in the ring (wrapping around), which is how a photo viewer
/// behaves. Every side-effecting call is appended to [`FakeBrowser::log`].
#[derive(Default)]
pub struct FakeBrowser {
    inner: Mutex<Inner>,
}

impl FakeBrowser {
    pub fn new(start_url: &str) -> Self {
        let browser = Self::default();
        browser.lock().current_url = start_url.to_string();
        browser
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn page(self, url: &str, page: FakePage) -> Self {
        self.lock().pages.insert(url.to_string(), page);
        self
    }

    /// Navigating to `from` with [`Browser::goto`] lands on `to`. Clicks and
    /// key presses are not redirected.
    pub fn redirect(self, from: &str, to: &str) -> Self {
        self.lock()
            .redirects
            .insert(from.to_string(), to.to_string());
        self
    }

    pub fn album_ring(self, urls: &[String]) -> Self {
        self.lock().ring = urls.to_vec();
        self
    }

    /// Pressing Enter in any field while on `url` navigates to `target`.
    pub fn on_enter(self, url: &str, target: &str) -> Self {
        self.lock()
            .on_enter
            .insert(url.to_string(), target.to_string());
        self
    }

    /// Queue errors returned by successive direct clicks on element `id`.
    pub fn fail_clicks(self, id: &str, errors: Vec<BrowserError>) -> Self {
        self.lock()
            .click_errors
            .insert(id.to_string(), errors.into());
        self
    }

    /// Queue errors returned by successive attribute reads while on `url`.
    pub fn fail_reads(self, url: &str, errors: Vec<BrowserError>) -> Self {
        self.lock()
            .read_errors
            .insert(url.to_string(), errors.into());
        self
    }

    /// Element `id` reports itself disabled for the first `checks` queries.
    pub fn enable_after(self, id: &str, checks: usize) -> Self {
        self.lock().enabled_after.insert(id.to_string(), checks);
        self
    }

    /// `locator` resolves only once more than `finds` lookups have been made.
    pub fn appear_after(self, locator: Locator, finds: usize) -> Self {
        self.lock().appear_after.insert(locator, finds);
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    pub fn find_count(&self) -> usize {
        self.lock().find_count
    }

    pub fn url(&self) -> String {
        self.lock().current_url.clone()
    }
}

#[async_trait::async_trait]
impl Browser for FakeBrowser {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let mut inner = self.lock();
        inner.log.push(format!("goto:{}", url));
        inner.navigate(url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.lock().current_url.clone())
    }

    async fn source(&self) -> Result<String, BrowserError> {
        Ok(self.lock().page().source)
    }

    async fn find(&self, locator: Locator) -> Result<Option<FakeElement>, BrowserError> {
        let mut inner = self.lock();
        inner.find_count += 1;
        if let Some(&after) = inner.appear_after.get(&locator) {
            if inner.find_count <= after {
                return Ok(None);
            }
        }
        let page = inner.page();
        if locator == BODY {
            return Ok((!page.no_body).then(|| FakeElement("body".into())));
        }
        Ok(page
            .elements
            .iter()
            .find(|(l, _)| *l == locator)
            .map(|(_, id)| FakeElement(id.clone())))
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let mut inner = self.lock();
        let url = inner.current_url.clone();
        if let Some(err) = inner.read_errors.get_mut(&url).and_then(|q| q.pop_front()) {
            return Err(err);
        }
        Ok(inner
            .page()
            .attributes
            .get(&(element.0.clone(), name.to_string()))
            .cloned())
    }

    async fn send_keys(&self, element: &FakeElement, keys: &str) -> Result<(), BrowserError> {
        let mut inner = self.lock();
        inner.log.push(format!("keys:{}:{}", element.0, keys));
        if keys == ARROW_RIGHT && element.0 == "body" {
            if let Some(pos) = inner.ring.iter().position(|u| *u == inner.current_url) {
                let next = inner.ring[(pos + 1) % inner.ring.len()].clone();
                inner.current_url = next;
            }
        } else if keys == ENTER {
            if let Some(target) = inner.on_enter.get(&inner.current_url).cloned() {
                inner.current_url = target;
            }
        }
        Ok(())
    }

    async fn clear(&self, element: &FakeElement) -> Result<(), BrowserError> {
        self.lock().log.push(format!("clear:{}", element.0));
        Ok(())
    }

    async fn click(&self, element: &FakeElement) -> Result<(), BrowserError> {
        let mut inner = self.lock();
        if let Some(err) = inner
            .click_errors
            .get_mut(&element.0)
            .and_then(|q| q.pop_front())
        {
            return Err(err);
        }
        inner.log.push(format!("click:{}", element.0));
        inner.apply_click(&element.0);
        Ok(())
    }

    async fn is_enabled(&self, element: &FakeElement) -> Result<bool, BrowserError> {
        let mut inner = self.lock();
        if let Some(remaining) = inner.enabled_after.get_mut(&element.0) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(false);
            }
        }
        Ok(!inner.page().disabled.contains(&element.0))
    }

    async fn execute(&self, script: &str, element: &FakeElement) -> Result<(), BrowserError> {
        let mut inner = self.lock();
        inner.log.push(format!("script:{}:{}", element.0, script));
        if script.contains(".click()") {
            inner.apply_click(&element.0);
        }
        Ok(())
    }
}
