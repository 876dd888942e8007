//! Header and sidebar shared by every screen behind the login.

use super::base::Navigation;
use crate::locator::{Locator, WaitState};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use async_trait::async_trait;

/// Parse the cart badge text as an item count
pub fn parse_badge(text: &str) -> ProbeResult<u32> {
    let trimmed = text.trim();
    trimmed.parse::<u32>().map_err(|e| {
        ProbeError::data_integrity(format!("cart badge `{trimmed}` is not a count: {e}"))
    })
}

/// Cart link, cart badge and the burger-menu sidebar
#[derive(Debug, Clone)]
pub struct AppShell {
    session: Session,
    cart_badge: Locator,
    cart_link: Locator,
    menu_button: Locator,
    sidebar: Locator,
    logout_link: Locator,
}

impl AppShell {
    /// Bind the shell locators to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            cart_badge: session.locator(".shopping_cart_badge"),
            cart_link: session.get_by_test_id("shopping-cart-link"),
            menu_button: session.locator("#react-burger-menu-btn"),
            sidebar: session.locator(".bm-menu"),
            logout_link: session.locator("#logout_sidebar_link"),
        }
    }

    /// The badge locator, for count assertions
    #[must_use]
    pub const fn cart_badge(&self) -> &Locator {
        &self.cart_badge
    }

    /// Number on the cart badge; 0 when the badge is not shown
    pub async fn cart_badge_count(&self) -> ProbeResult<u32> {
        self.session
            .step("Get cart badge count", async {
                if !self.cart_badge.is_visible().await? {
                    return Ok(0);
                }
                parse_badge(&self.cart_badge.text_content().await?)
            })
            .await
    }

    /// Whether the cart badge is shown
    pub async fn is_cart_badge_visible(&self) -> ProbeResult<bool> {
        self.session
            .step("Check if cart badge is visible", self.cart_badge.is_visible())
            .await
    }

    /// Click the cart icon
    pub async fn navigate_to_cart(&self) -> ProbeResult<()> {
        self.session
            .step("Navigate to cart page", self.cart_link.click())
            .await
    }

    /// Open the burger menu and wait for the sidebar to slide in
    pub async fn open_sidebar_menu(&self) -> ProbeResult<()> {
        self.session
            .step("Open sidebar menu", async {
                self.menu_button.click().await?;
                self.sidebar.wait_for(WaitState::Visible).await
            })
            .await
    }

    /// Click the logout link; the sidebar must already be open
    pub async fn click_logout(&self) -> ProbeResult<()> {
        self.session
            .step("Click logout button", self.logout_link.click())
            .await
    }

    /// Open the sidebar, then log out
    pub async fn logout(&self) -> ProbeResult<()> {
        self.session
            .step("Perform logout", async {
                self.open_sidebar_menu().await?;
                self.click_logout().await
            })
            .await
    }

    /// Whether the sidebar is open
    pub async fn is_sidebar_visible(&self) -> ProbeResult<bool> {
        self.session
            .step("Check if sidebar is visible", self.sidebar.is_visible())
            .await
    }
}

/// Screens that show the authenticated shell.
///
/// Implementors only provide [`Authenticated::shell`].
#[async_trait]
pub trait Authenticated: Navigation {
    /// The embedded shell component
    fn shell(&self) -> &AppShell;

    /// Number on the cart badge; 0 when the badge is not shown
    async fn cart_badge_count(&self) -> ProbeResult<u32> {
        self.shell().cart_badge_count().await
    }

    /// Whether the cart badge is shown
    async fn is_cart_badge_visible(&self) -> ProbeResult<bool> {
        self.shell().is_cart_badge_visible().await
    }

    /// Click the cart icon
    async fn navigate_to_cart(&self) -> ProbeResult<()> {
        self.shell().navigate_to_cart().await
    }

    /// Open the burger menu
    async fn open_sidebar_menu(&self) -> ProbeResult<()> {
        self.shell().open_sidebar_menu().await
    }

    /// Click logout in the open sidebar
    async fn click_logout(&self) -> ProbeResult<()> {
        self.shell().click_logout().await
    }

    /// Open the sidebar, then log out
    async fn logout(&self) -> ProbeResult<()> {
        self.shell().logout().await
    }

    /// Whether the sidebar is open
    async fn is_sidebar_visible(&self) -> ProbeResult<bool> {
        self.shell().is_sidebar_visible().await
    }
}
