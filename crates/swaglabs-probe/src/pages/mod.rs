//! Page objects for the Swag Labs storefront.
//!
//! Capabilities compose instead of inheriting:
//!
//! ```text
//! PageObject (session + route)
//!   └── Navigation (goto, load wait, url, screenshot)
//!         └── Authenticated (cart badge, sidebar, logout via AppShell)
//! ```
//!
//! [`LoginPage`] is the only screen without the authenticated shell.

pub mod base;
pub mod checkout;
pub mod inventory;
pub mod login;
pub mod shell;

pub use base::{Navigation, PageObject};
pub use checkout::{CartPage, CheckoutCompletePage, CheckoutInfoPage, CheckoutOverviewPage};
pub use inventory::{parse_price, InventoryDetailsPage, InventoryPage, SortOption};
pub use login::LoginPage;
pub use shell::{parse_badge, AppShell, Authenticated};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of storefront routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// `/`
    Login,
    /// `/inventory.html`
    Inventory,
    /// `/inventory-item.html?id=N`
    InventoryItem,
    /// `/cart.html`
    Cart,
    /// `/checkout-step-one.html`
    CheckoutStepOne,
    /// `/checkout-step-two.html`
    CheckoutStepTwo,
    /// `/checkout-complete.html`
    CheckoutComplete,
}

impl Route {
    /// Every route, in purchase-flow order
    pub const ALL: [Self; 7] = [
        Self::Login,
        Self::Inventory,
        Self::InventoryItem,
        Self::Cart,
        Self::CheckoutStepOne,
        Self::CheckoutStepTwo,
        Self::CheckoutComplete,
    ];

    /// Origin-relative path
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Inventory => "/inventory.html",
            Self::InventoryItem => "/inventory-item.html",
            Self::Cart => "/cart.html",
            Self::CheckoutStepOne => "/checkout-step-one.html",
            Self::CheckoutStepTwo => "/checkout-step-two.html",
            Self::CheckoutComplete => "/checkout-complete.html",
        }
    }

    /// Route shown at `url`, ignoring origin, query and fragment
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let path = path_of(url);
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Whether `url` shows this route
    #[must_use]
    pub fn matches(self, url: &str) -> bool {
        path_of(url) == self.path()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Path component of an absolute or origin-relative URL
#[must_use]
pub fn path_of(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(i) => {
            let after = &url[i + 3..];
            after.find('/').map_or("", |slash| &after[slash..])
        }
        None => url,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let path = &rest[..end];
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Value of a query-string parameter
#[must_use]
pub fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}
