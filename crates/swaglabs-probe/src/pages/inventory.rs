//! Product listing at `/inventory.html` and product details at
//! `/inventory-item.html`.

use super::base::{Navigation, PageObject};
use super::shell::{AppShell, Authenticated};
use super::Route;
use crate::locator::{Locator, TextMatch, WaitState};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a displayed price such as `$29.99`.
///
/// A leading currency symbol and surrounding whitespace are tolerated;
/// anything else that is not a finite number is rejected.
pub fn parse_price(text: &str) -> ProbeResult<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    let value: f64 = number.parse().map_err(|_| {
        ProbeError::data_integrity(format!("price `{trimmed}` is not a number"))
    })?;
    if !value.is_finite() {
        return Err(ProbeError::data_integrity(format!(
            "price `{trimmed}` is not finite"
        )));
    }
    Ok(value)
}

/// Sort orders offered by the product sort dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOption {
    /// Name (A to Z), the storefront default
    #[default]
    NameAscending,
    /// Name (Z to A)
    NameDescending,
    /// Price (low to high)
    PriceAscending,
    /// Price (high to low)
    PriceDescending,
}

impl SortOption {
    /// All four orders
    pub const ALL: [Self; 4] = [
        Self::NameAscending,
        Self::NameDescending,
        Self::PriceAscending,
        Self::PriceDescending,
    ];

    /// `<option value>` in the dropdown
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::NameAscending => "az",
            Self::NameDescending => "za",
            Self::PriceAscending => "lohi",
            Self::PriceDescending => "hilo",
        }
    }

    /// Visible option label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAscending => "Name (A to Z)",
            Self::NameDescending => "Name (Z to A)",
            Self::PriceAscending => "Price (low to high)",
            Self::PriceDescending => "Price (high to low)",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for SortOption {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.value() == s)
            .ok_or_else(|| ProbeError::data_integrity(format!("unknown sort option `{s}`")))
    }
}

/// Product listing
#[derive(Debug, Clone)]
pub struct InventoryPage {
    session: Session,
    shell: AppShell,
    container: Locator,
    items: Locator,
    sort_select: Locator,
    item_names: Locator,
    item_prices: Locator,
}

impl InventoryPage {
    /// Bind the listing locators to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            shell: AppShell::new(session),
            container: session.locator(".inventory_container").first(),
            items: session.get_by_test_id("inventory-item"),
            sort_select: session.get_by_test_id("product-sort-container"),
            item_names: session.get_by_test_id("inventory-item-name"),
            item_prices: session.get_by_test_id("inventory-item-price"),
        }
    }

    /// Open the listing and wait for the product grid
    pub async fn goto(&self) -> ProbeResult<()> {
        self.session
            .step("Navigate to inventory page", async {
                self.navigate_to(Route::Inventory.path()).await?;
                self.container.wait_for(WaitState::Visible).await
            })
            .await
    }

    /// Whether the product grid is shown right now
    pub async fn is_loaded(&self) -> ProbeResult<bool> {
        self.session
            .step("Check if inventory page is loaded", self.container.is_visible())
            .await
    }

    /// The product rows, for count assertions
    #[must_use]
    pub const fn items(&self) -> &Locator {
        &self.items
    }

    /// Row whose name element reads exactly `name`
    fn row(&self, name: &str) -> Locator {
        let name_cell = self
            .session
            .get_by_test_id("inventory-item-name")
            .has_text(TextMatch::exact(name));
        self.items.has(&name_cell)
    }

    /// Number of product rows
    pub async fn item_count(&self) -> ProbeResult<usize> {
        self.session
            .step("Get inventory item count", self.items.count())
            .await
    }

    /// Click "Add to cart" in the row for `name`
    pub async fn add_product_to_cart(&self, name: &str) -> ProbeResult<()> {
        let button = self
            .row(name)
            .get_by_role("button", Some(TextMatch::pattern_ignore_case("add to cart")));
        self.session
            .step(&format!("Add product to cart: {name}"), button.click())
            .await
    }

    /// Text of the add/remove toggle in the row for `name`
    pub async fn add_button_text(&self, name: &str) -> ProbeResult<String> {
        let button = self.row(name).locator("button");
        let text = self
            .session
            .step(&format!("Read cart button for: {name}"), button.text_content())
            .await?;
        Ok(text.trim().to_string())
    }

    /// Product names in display order
    pub async fn product_names(&self) -> ProbeResult<Vec<String>> {
        let names = self
            .session
            .step("Get all product names", self.item_names.all_text_contents())
            .await?;
        Ok(names.into_iter().map(|n| n.trim().to_string()).collect())
    }

    /// Product prices in display order
    pub async fn product_prices(&self) -> ProbeResult<Vec<f64>> {
        self.session
            .step("Get all product prices", async {
                self.item_prices
                    .all_text_contents()
                    .await?
                    .iter()
                    .map(|text| parse_price(text))
                    .collect::<ProbeResult<Vec<f64>>>()
            })
            .await
    }

    /// Choose a sort order from the dropdown
    pub async fn select_sort(&self, option: SortOption) -> ProbeResult<()> {
        self.session
            .step(
                &format!("Select sort option: {option}"),
                self.sort_select.select_option(option.value()),
            )
            .await
    }

    /// Click the product title to open its details
    pub async fn open_product_details(&self, name: &str) -> ProbeResult<()> {
        let link = self.session.locator(".inventory_item_name").has_text(name);
        self.session
            .step(&format!("Open product details for: {name}"), link.click())
            .await
    }
}

impl PageObject for InventoryPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn route(&self) -> Route {
        Route::Inventory
    }
}

impl Navigation for InventoryPage {}

impl Authenticated for InventoryPage {
    fn shell(&self) -> &AppShell {
        &self.shell
    }
}

/// Single-product view
#[derive(Debug, Clone)]
pub struct InventoryDetailsPage {
    session: Session,
    shell: AppShell,
    container: Locator,
    back_button: Locator,
    add_button: Locator,
    remove_button: Locator,
    name_label: Locator,
}

impl InventoryDetailsPage {
    /// Bind the detail locators to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            shell: AppShell::new(session),
            container: session.locator(".inventory_details_container"),
            back_button: session.get_by_test_id("back-to-products"),
            add_button: session.locator(r#"button[id^="add-to-cart"]"#),
            remove_button: session.locator(r#"button[id^="remove"]"#),
            name_label: session.get_by_test_id("inventory-item-name"),
        }
    }

    /// Wait for the detail panel, then report whether it is shown
    pub async fn is_loaded(&self) -> ProbeResult<bool> {
        self.session
            .step("Check if inventory details page is loaded", async {
                self.container.wait_for(WaitState::Visible).await?;
                self.container.is_visible().await
            })
            .await
    }

    /// Product name as displayed
    pub async fn product_name(&self) -> ProbeResult<String> {
        let text = self
            .session
            .step("Get product name from details", self.name_label.text_content())
            .await?;
        Ok(text.trim().to_string())
    }

    /// Click "Add to cart"; fails when the product is already in the cart
    pub async fn click_add_to_cart(&self) -> ProbeResult<()> {
        self.session
            .step("Add product to cart from details page", self.add_button.click())
            .await
    }

    /// Click "Remove"; fails when the product is not in the cart
    pub async fn click_remove(&self) -> ProbeResult<()> {
        self.session
            .step("Remove product from cart from details page", self.remove_button.click())
            .await
    }

    /// Click "Back to products"
    pub async fn go_back(&self) -> ProbeResult<()> {
        self.session
            .step("Navigate back to product list", self.back_button.click())
            .await
    }
}

impl PageObject for InventoryDetailsPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn route(&self) -> Route {
        Route::InventoryItem
    }
}

impl Navigation for InventoryDetailsPage {}

impl Authenticated for InventoryDetailsPage {
    fn shell(&self) -> &AppShell {
        &self.shell
    }
}
