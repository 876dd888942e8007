//! Storefront test data: accounts, catalogue names and expected messages.
//!
//! Page objects never hardcode any of these; scenarios pass them in.

use serde::{Deserialize, Serialize};

/// Password shared by every storefront account
pub const PASSWORD: &str = "secret_sauce";

/// Login credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct User {
    /// Username typed into the login form
    pub username: &'static str,
    /// Password typed into the login form
    pub password: &'static str,
}

impl User {
    const fn new(username: &'static str) -> Self {
        Self {
            username,
            password: PASSWORD,
        }
    }
}

/// Accounts provisioned by the storefront
pub mod users {
    use super::User;

    /// Regular shopper
    pub const STANDARD: User = User::new("standard_user");
    /// Rejected at login
    pub const LOCKED_OUT: User = User::new("locked_out_user");
    /// Broken images and form fields
    pub const PROBLEM: User = User::new("problem_user");
    /// Slow responses
    pub const PERFORMANCE_GLITCH: User = User::new("performance_glitch_user");
    /// Some actions fail
    pub const ERROR: User = User::new("error_user");
    /// Visual regressions
    pub const VISUAL: User = User::new("visual_user");

    /// Every account that can log in
    pub const ACCEPTED: [User; 5] = [STANDARD, PROBLEM, PERFORMANCE_GLITCH, ERROR, VISUAL];
}

/// Product names in catalogue order
pub mod products {
    pub const BACKPACK: &str = "Sauce Labs Backpack";
    pub const BIKE_LIGHT: &str = "Sauce Labs Bike Light";
    pub const BOLT_T_SHIRT: &str = "Sauce Labs Bolt T-Shirt";
    pub const FLEECE_JACKET: &str = "Sauce Labs Fleece Jacket";
    pub const ONESIE: &str = "Sauce Labs Onesie";
    pub const RED_T_SHIRT: &str = "Test.allTheThings() T-Shirt (Red)";

    /// All six products
    pub const ALL: [&str; 6] = [
        BACKPACK,
        BIKE_LIGHT,
        BOLT_T_SHIRT,
        FLEECE_JACKET,
        ONESIE,
        RED_T_SHIRT,
    ];
}

/// Error banners shown by the login form
pub mod errors {
    pub const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
    pub const INVALID_CREDENTIALS: &str =
        "Epic sadface: Username and password do not match any user in this service";
    pub const USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
    pub const PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";

    /// Fragments of the checkout-information errors
    pub mod checkout {
        pub const FIRST_NAME_REQUIRED: &str = "First Name is required";
        pub const LAST_NAME_REQUIRED: &str = "Last Name is required";
        pub const POSTAL_CODE_REQUIRED: &str = "Postal Code is required";
    }
}

/// Customer details used to fill the checkout form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Zip or postal code
    pub postal_code: String,
}

impl Customer {
    /// Customer from its three fields
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }
}

impl Default for Customer {
    fn default() -> Self {
        Self::new("John", "Doe", "12345")
    }
}
