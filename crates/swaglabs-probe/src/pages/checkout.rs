//! Cart and the three checkout screens.
//!
//! The storefront moves `Cart → Info → Overview → Complete`; cancelling from
//! Info returns to the cart and cancelling from Overview returns to the
//! listing. None of these pages enforce that order: each operation clicks
//! and returns, and the caller checks where it ended up.

use super::base::{Navigation, PageObject};
use super::shell::{AppShell, Authenticated};
use super::Route;
use crate::data::Customer;
use crate::locator::{Locator, TextMatch};
use crate::result::ProbeResult;
use crate::session::Session;

/// Header expected on the confirmation screen, compared case-insensitively
pub const THANK_YOU_HEADER: &str = "THANK YOU FOR YOUR ORDER";

macro_rules! authenticated_page {
    ($page:ty, $route:expr) => {
        impl PageObject for $page {
            fn session(&self) -> &Session {
                &self.session
            }

            fn route(&self) -> Route {
                $route
            }
        }

        impl Navigation for $page {}

        impl Authenticated for $page {
            fn shell(&self) -> &AppShell {
                &self.shell
            }
        }
    };
}

// ============================================================================
// Cart
// ============================================================================

/// Shopping cart at `/cart.html`
#[derive(Debug, Clone)]
pub struct CartPage {
    session: Session,
    shell: AppShell,
    cart_list: Locator,
    cart_items: Locator,
    checkout_button: Locator,
    continue_shopping_button: Locator,
}

impl CartPage {
    /// Bind the cart locators to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            shell: AppShell::new(session),
            cart_list: session.locator(".cart_list"),
            cart_items: session.locator(".cart_item"),
            checkout_button: session.get_by_test_id("checkout"),
            continue_shopping_button: session.get_by_test_id("continue-shopping"),
        }
    }

    /// The cart list container
    #[must_use]
    pub const fn cart_list(&self) -> &Locator {
        &self.cart_list
    }

    /// Open the cart directly
    pub async fn goto(&self) -> ProbeResult<()> {
        self.session
            .step("Navigate to cart page", self.navigate_to(Route::Cart.path()))
            .await
    }

    /// Number of line items
    pub async fn item_count(&self) -> ProbeResult<usize> {
        self.session
            .step("Get cart item count", self.cart_items.count())
            .await
    }

    /// Whether a line item named like `name` is shown
    pub async fn is_product_in_cart(&self, name: &str) -> ProbeResult<bool> {
        let product = self
            .session
            .get_by_test_id("inventory-item-name")
            .has_text(name);
        self.session
            .step(&format!("Check if product is in cart: {name}"), product.is_visible())
            .await
    }

    /// Click "Checkout"
    pub async fn click_checkout(&self) -> ProbeResult<()> {
        self.session
            .step("Click checkout button", self.checkout_button.click())
            .await
    }

    /// Click "Continue Shopping"
    pub async fn click_continue_shopping(&self) -> ProbeResult<()> {
        self.session
            .step(
                "Click continue shopping button",
                self.continue_shopping_button.click(),
            )
            .await
    }

    /// Click "Remove" on the first line item
    pub async fn remove_first_item(&self) -> ProbeResult<()> {
        let remove = self.session.locator(r#"button[id^="remove"]"#).first();
        self.session
            .step("Remove first cart item", remove.click())
            .await
    }
}

authenticated_page!(CartPage, Route::Cart);

// ============================================================================
// Checkout: your information
// ============================================================================

/// Customer details form at `/checkout-step-one.html`
#[derive(Debug, Clone)]
pub struct CheckoutInfoPage {
    session: Session,
    shell: AppShell,
    first_name_input: Locator,
    last_name_input: Locator,
    postal_code_input: Locator,
    continue_button: Locator,
    cancel_button: Locator,
    error_message: Locator,
}

impl CheckoutInfoPage {
    /// Bind the form locators to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            shell: AppShell::new(session),
            first_name_input: session.get_by_placeholder("First Name"),
            last_name_input: session.get_by_placeholder("Last Name"),
            postal_code_input: session.get_by_placeholder("Zip/Postal Code"),
            continue_button: session.get_by_role("button", Some(TextMatch::contains("Continue"))),
            cancel_button: session.get_by_role("button", Some(TextMatch::contains("Cancel"))),
            error_message: session.get_by_test_id("error"),
        }
    }

    /// Fill the three fields, one annotated step each
    pub async fn fill_checkout_info(
        &self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> ProbeResult<()> {
        let session = &self.session;
        session
            .step("Fill checkout information form", async {
                session
                    .step(
                        &format!("Enter first name: {first_name}"),
                        self.first_name_input.fill(first_name),
                    )
                    .await?;
                session
                    .step(
                        &format!("Enter last name: {last_name}"),
                        self.last_name_input.fill(last_name),
                    )
                    .await?;
                session
                    .step(
                        &format!("Enter zip code: {postal_code}"),
                        self.postal_code_input.fill(postal_code),
                    )
                    .await
            })
            .await
    }

    /// Fill the form from a [`Customer`]
    pub async fn fill_customer(&self, customer: &Customer) -> ProbeResult<()> {
        self.fill_checkout_info(
            &customer.first_name,
            &customer.last_name,
            &customer.postal_code,
        )
        .await
    }

    /// Click "Continue"
    pub async fn click_continue(&self) -> ProbeResult<()> {
        self.session
            .step("Click continue button", self.continue_button.click())
            .await
    }

    /// Click "Cancel"
    pub async fn click_cancel(&self) -> ProbeResult<()> {
        self.session
            .step("Click cancel button", self.cancel_button.click())
            .await
    }

    /// Error banner text, or `None` when no error is shown
    pub async fn error_message(&self) -> ProbeResult<Option<String>> {
        self.session
            .step("Get checkout error message", async {
                if !self.error_message.is_visible().await? {
                    return Ok(None);
                }
                let text = self.error_message.text_content().await?;
                Ok(Some(text.trim().to_string()))
            })
            .await
    }

    /// Whether the error banner is shown
    pub async fn is_error_message_visible(&self) -> ProbeResult<bool> {
        self.session
            .step(
                "Check if checkout error message is visible",
                self.error_message.is_visible(),
            )
            .await
    }
}

authenticated_page!(CheckoutInfoPage, Route::CheckoutStepOne);

// ============================================================================
// Checkout: overview
// ============================================================================

/// Order review at `/checkout-step-two.html`
#[derive(Debug, Clone)]
pub struct CheckoutOverviewPage {
    session: Session,
    shell: AppShell,
    cart_items: Locator,
    summary_info: Locator,
    finish_button: Locator,
    cancel_button: Locator,
    total_label: Locator,
}

impl CheckoutOverviewPage {
    /// Bind the overview locators to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            shell: AppShell::new(session),
            cart_items: session.locator(".cart_item"),
            summary_info: session.locator(".summary_info"),
            finish_button: session.get_by_test_id("finish"),
            cancel_button: session.get_by_test_id("cancel"),
            total_label: session.locator(".summary_total_label"),
        }
    }

    /// Number of line items under review
    pub async fn order_item_count(&self) -> ProbeResult<usize> {
        self.session
            .step("Get order item count", self.cart_items.count())
            .await
    }

    /// Total label such as `Total: $32.39`, or `None` when absent
    pub async fn total_price_text(&self) -> ProbeResult<Option<String>> {
        self.session
            .step("Get total price text", async {
                if self.total_label.count().await? == 0 {
                    return Ok(None);
                }
                let text = self.total_label.text_content().await?;
                Ok(Some(text.trim().to_string()))
            })
            .await
    }

    /// Whether the payment/shipping summary is shown
    pub async fn is_summary_visible(&self) -> ProbeResult<bool> {
        self.session
            .step("Check if summary is visible", self.summary_info.is_visible())
            .await
    }

    /// Click "Finish"
    pub async fn click_finish(&self) -> ProbeResult<()> {
        self.session
            .step("Click finish button", self.finish_button.click())
            .await
    }

    /// Click "Cancel"
    pub async fn click_cancel(&self) -> ProbeResult<()> {
        self.session
            .step("Click cancel button", self.cancel_button.click())
            .await
    }
}

authenticated_page!(CheckoutOverviewPage, Route::CheckoutStepTwo);

// ============================================================================
// Checkout: complete
// ============================================================================

/// Confirmation at `/checkout-complete.html`
#[derive(Debug, Clone)]
pub struct CheckoutCompletePage {
    session: Session,
    shell: AppShell,
    complete_header: Locator,
    complete_text: Locator,
    back_home_button: Locator,
}

impl CheckoutCompletePage {
    /// Bind the confirmation locators to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            shell: AppShell::new(session),
            complete_header: session.locator(".complete-header"),
            complete_text: session.locator(".complete-text"),
            back_home_button: session.get_by_test_id("back-to-products"),
        }
    }

    /// Header text, or `None` when absent
    pub async fn completion_header(&self) -> ProbeResult<Option<String>> {
        self.session
            .step("Get completion header text", async {
                if self.complete_header.count().await? == 0 {
                    return Ok(None);
                }
                let text = self.complete_header.text_content().await?;
                Ok(Some(text.trim().to_string()))
            })
            .await
    }

    /// Body text under the header
    pub async fn completion_text(&self) -> ProbeResult<String> {
        Ok(self.complete_text.text_content().await?.trim().to_string())
    }

    /// Whether the header reads "THANK YOU FOR YOUR ORDER", with or without `!`
    pub async fn is_thank_you_header_visible(&self) -> ProbeResult<bool> {
        let header = self.completion_header().await?;
        Ok(header.is_some_and(|text| {
            let upper = text.to_uppercase();
            upper.strip_suffix('!').unwrap_or(&upper) == THANK_YOU_HEADER
        }))
    }

    /// Click "Back Home"
    pub async fn click_back_home(&self) -> ProbeResult<()> {
        self.session
            .step("Click back home button", self.back_home_button.click())
            .await
    }
}

authenticated_page!(CheckoutCompletePage, Route::CheckoutComplete);
