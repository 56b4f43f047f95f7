/// URLs on the photo-sharing site, relative to a configurable base.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

pub const DEFAULT_BASE_URL: &str = "https://www.facebook.com";

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Endpoints {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn login(&self) -> String {
        format!("{}/login", self.base)
    }

    pub fn profile(&self, account: &str) -> String {
        format!("{}/{}", self.base, account)
    }

    /// Photos page for a vanity-named profile. Numeric-only profiles resolve
    /// to `profile.php?id=...` and need [`photos_for_profile_url`] instead.
    pub fn photos(&self, account: &str) -> String {
        format!("{}/{}/photos", self.base, account)
    }

    /// Resolve a link `href` that may be site-relative (`/photo/?fbid=...`).
    pub fn absolute(&self, href: &str) -> String {
        if href.starts_with('/') {
            format!("{}{}", self.base, href)
        } else {
            href.to_string()
        }
    }
}

/// Photos page for a profile that resolved to a `profile.php?id=...` URL.
pub fn photos_for_profile_url(profile_url: &str) -> String {
    format!("{}&sk=photos", profile_url)
}
