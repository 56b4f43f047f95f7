//! Browser login with cookie-consent handling and operator-assisted
//! two-step verification.
//!
//! The flow: login page → consent dialog → credentials (unless the browser
//! profile is already signed in) → optional challenge hand-off → reload →
//! consent dialog again → classification. Credentials are submitted at most
//! once per run.

pub mod consent;
pub mod error;
pub mod twofa;

use std::time::Duration;

use tokio::time::Instant;

use crate::browser::{first_present, safe_click, Browser, Locator, ENTER};
use crate::endpoints::Endpoints;
use crate::extract::BLOCK_NOTICE;

pub use self::error::AuthError;
pub use self::twofa::{operator_channel, spawn_stdin_operator, OperatorGate};

use self::consent::dismiss_consent_dialog;

/// Any URL containing this is still on the login surface.
const LOGIN_MARKER: &str = "login";

/// URL fragments of the two-step verification and captcha checkpoints.
const CHALLENGE_MARKERS: &[&str] = &["two_step_verification", "checkpoint"];

const EMAIL_FIELDS: &[Locator] = &[Locator::Id("email"), Locator::Name("email")];
const PASSWORD_FIELDS: &[Locator] = &[Locator::Id("pass"), Locator::Name("pass")];
const SUBMIT_BUTTONS: &[Locator] = &[
    Locator::Id("loginbutton"),
    Locator::Name("login"),
    Locator::XPath("//button[@type='submit' and @name='login']"),
];

const FORM_TIMEOUT: Duration = Duration::from_secs(20);
const SUBMIT_ENABLED_TIMEOUT: Duration = Duration::from_secs(10);
const ENABLED_POLL_INTERVAL: Duration = Duration::from_millis(200);
const SUBMIT_SETTLE: Duration = Duration::from_secs(3);
const CHALLENGE_SETTLE: Duration = Duration::from_secs(3);

const CHALLENGE_PROMPT: &str = "Two-step verification or captcha detected. \
     Complete it in the browser, then press ENTER here to continue.";

/// Account credentials. `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of the login flow.
///
/// `authenticated` is only ever set by classifying the final browser state, so
/// holding an authenticated `Session` proves the login boundary was crossed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
    challenge_pending: bool,
    blocked: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_challenge_pending(&self) -> bool {
        self.challenge_pending
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Settle the session state from where the browser ended up.
    async fn classify<B>(&mut self, browser: &B) -> Result<(), AuthError>
    where
        B: Browser + ?Sized,
    {
        let url = browser.current_url().await?;
        self.authenticated = is_logged_in(&url);
        self.blocked = !self.authenticated && browser.source().await?.contains(BLOCK_NOTICE);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn authenticated_for_tests() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }
}

fn is_logged_in(url: &str) -> bool {
    !url.contains(LOGIN_MARKER)
}

fn is_challenge(url: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Establish an authenticated session or fail with a classified reason.
pub async fn login<B>(
    browser: &B,
    endpoints: &Endpoints,
    credentials: &Credentials,
    gate: &mut OperatorGate,
) -> Result<Session, AuthError>
where
    B: Browser + ?Sized,
{
    let mut session = Session::default();

    tracing::info!("Going to the login page");
    browser.goto(&endpoints.login()).await?;
    dismiss_consent_dialog(browser).await?;

    if is_logged_in(&browser.current_url().await?) {
        tracing::info!("Browser profile is already signed in");
    } else {
        tracing::info!(email = %credentials.email, "Logging in");
        submit_credentials(browser, credentials).await?;
        tokio::time::sleep(SUBMIT_SETTLE).await;

        if is_challenge(&browser.current_url().await?) {
            session.challenge_pending = true;
            tracing::warn!("Two-step verification or captcha required");
            gate.wait(CHALLENGE_PROMPT).await?;
            tokio::time::sleep(CHALLENGE_SETTLE).await;
            session.challenge_pending = false;
        }

        browser.reload().await?;
    }

    // A second consent dialog can appear only once signed in.
    dismiss_consent_dialog(browser).await?;

    session.classify(browser).await?;
    if !session.authenticated {
        return Err(AuthError::Rejected {
            blocked: session.blocked,
        });
    }
    tracing::info!("Login successful");
    Ok(session)
}

async fn submit_credentials<B>(browser: &B, credentials: &Credentials) -> Result<(), AuthError>
where
    B: Browser + ?Sized,
{
    if first_present(browser, &EMAIL_FIELDS[..1], FORM_TIMEOUT)
        .await?
        .is_none()
    {
        return Err(AuthError::FormNotFound("email field"));
    }
    let email = first_present(browser, EMAIL_FIELDS, Duration::ZERO)
        .await?
        .ok_or(AuthError::FormNotFound("email field"))?;
    let password = first_present(browser, PASSWORD_FIELDS, Duration::ZERO)
        .await?
        .ok_or(AuthError::FormNotFound("password field"))?;

    browser.clear(&email).await?;
    browser.clear(&password).await?;
    browser.send_keys(&email, &credentials.email).await?;
    browser.send_keys(&password, &credentials.password).await?;

    let submit = first_present(browser, SUBMIT_BUTTONS, Duration::ZERO).await?;
    let clicked = match &submit {
        Some(button) => {
            wait_until_enabled(browser, button).await;
            safe_click(browser, Some(button)).await
        }
        None => false,
    };
    if !clicked {
        tracing::debug!("Submitting login form with ENTER");
        browser.send_keys(&password, ENTER).await?;
    }
    Ok(())
}

/// Give the submit control a bounded chance to become interactive. Proceeds
/// regardless once the deadline passes.
async fn wait_until_enabled<B>(browser: &B, element: &B::Element)
where
    B: Browser + ?Sized,
{
    let deadline = Instant::now() + SUBMIT_ENABLED_TIMEOUT;
    loop {
        match browser.is_enabled(element).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Could not query submit button state");
                return;
            }
        }
        if Instant::now() >= deadline {
            tracing::debug!("Submit button still disabled, clicking anyway");
            return;
        }
        tokio::time::sleep(ENABLED_POLL_INTERVAL).await;
    }
}
