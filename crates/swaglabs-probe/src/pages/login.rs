//! The login screen at `/`.

use super::base::{Navigation, PageObject};
use super::Route;
use crate::locator::{Locator, TextMatch, WaitState};
use crate::result::ProbeResult;
use crate::session::Session;

/// Login form
#[derive(Debug, Clone)]
pub struct LoginPage {
    session: Session,
    username_input: Locator,
    password_input: Locator,
    login_button: Locator,
    error_message: Locator,
}

impl LoginPage {
    /// Bind the login locators to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            username_input: session.get_by_placeholder("Username"),
            password_input: session.get_by_placeholder("Password"),
            login_button: session.get_by_role("button", Some(TextMatch::contains("Login"))),
            error_message: session.get_by_test_id("error"),
        }
    }

    /// Open the login screen
    pub async fn goto(&self) -> ProbeResult<()> {
        self.session
            .step("Navigate to login page", self.navigate_to(Route::Login.path()))
            .await
    }

    /// Fill both fields and submit; the outcome is not checked
    pub async fn login(&self, username: &str, password: &str) -> ProbeResult<()> {
        let session = &self.session;
        session
            .step(&format!("Login with username: {username}"), async {
                session
                    .step("Fill username", self.username_input.fill(username))
                    .await?;
                session
                    .step("Fill password", self.password_input.fill(password))
                    .await?;
                session
                    .step("Click login button", self.login_button.click())
                    .await
            })
            .await
    }

    /// Text of the error banner, once it is shown
    pub async fn error_message(&self) -> ProbeResult<String> {
        self.error_message.wait_for(WaitState::Visible).await?;
        Ok(self.error_message.text_content().await?.trim().to_string())
    }

    /// Whether the error banner is shown
    pub async fn is_error_message_visible(&self) -> ProbeResult<bool> {
        self.error_message.is_visible().await
    }

    /// Whether the login button is shown
    pub async fn is_login_button_visible(&self) -> ProbeResult<bool> {
        self.login_button.is_visible().await
    }

    /// Login button and username field both shown
    pub async fn is_on_login_page(&self) -> ProbeResult<bool> {
        self.session
            .step("Verify user is on login page", async {
                Ok(self.login_button.is_visible().await?
                    && self.username_input.is_visible().await?)
            })
            .await
    }
}

impl PageObject for LoginPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn route(&self) -> Route {
        Route::Login
    }
}

impl Navigation for LoginPage {}
