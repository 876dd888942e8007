//! Capabilities every page object has.

use super::Route;
use crate::result::ProbeResult;
use crate::session::Session;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// A screen of the storefront bound to a session
pub trait PageObject: Send + Sync {
    /// Session all locators of this page resolve against
    fn session(&self) -> &Session;

    /// Route this page lives at
    fn route(&self) -> Route;

    /// Page name for logging/debugging
    fn page_name(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("page")
    }
}

/// Navigation helpers shared by every page.
///
/// All methods have default implementations over [`PageObject::session`].
#[async_trait]
pub trait Navigation: PageObject {
    /// Navigate to a route relative to the configured base URL
    async fn navigate_to(&self, path: &str) -> ProbeResult<()> {
        info!(page = self.page_name(), path, "navigate_to");
        self.session().goto(path).await
    }

    /// Wait until the DOM of the current document has been parsed
    async fn wait_for_page_load(&self) -> ProbeResult<()> {
        self.session().wait_for_load_state().await
    }

    /// URL currently shown
    async fn current_url(&self) -> ProbeResult<String> {
        self.session().url().await
    }

    /// Whether the current URL is this page's route
    async fn is_current(&self) -> ProbeResult<bool> {
        Ok(self.route().matches(&self.current_url().await?))
    }

    /// Full-page PNG written to `destination`; the bytes are returned too
    async fn take_screenshot(&self, destination: &Path) -> ProbeResult<Vec<u8>> {
        self.session().screenshot_to(destination).await
    }

    /// Document title
    async fn title(&self) -> ProbeResult<String> {
        self.session().title().await
    }

    /// Browser back button
    async fn go_back(&self) -> ProbeResult<()> {
        self.session().go_back().await
    }

    /// Browser reload
    async fn reload(&self) -> ProbeResult<()> {
        self.session().reload().await
    }
}
