//! Page fixtures: which page objects a scenario can ask for, and how each
//! one is prepared before it is handed over.
//!
//! Every [`crate::context::TestContext`] owns one [`Fixtures`] registry.
//! Asking for a page always constructs a fresh object over the context's
//! session. Pages registered with [`Setup::Navigate`] additionally open
//! their route the first time they are requested; the login page is
//! registered that way by default.

use crate::pages::{
    CartPage, CheckoutCompletePage, CheckoutInfoPage, CheckoutOverviewPage, InventoryDetailsPage,
    InventoryPage, LoginPage, Navigation,
};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Logical fixture names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRole {
    /// `loginPage`
    Login,
    /// `inventoryPage`
    Inventory,
    /// `inventoryDetailsPage`
    InventoryDetails,
    /// `cartPage`
    Cart,
    /// `checkoutInfoPage`
    CheckoutInfo,
    /// `checkoutOverviewPage`
    CheckoutOverview,
    /// `checkoutCompletePage`
    CheckoutComplete,
}

impl PageRole {
    /// Every role
    pub const ALL: [Self; 7] = [
        Self::Login,
        Self::Inventory,
        Self::InventoryDetails,
        Self::Cart,
        Self::CheckoutInfo,
        Self::CheckoutOverview,
        Self::CheckoutComplete,
    ];

    /// Fixture name as scenarios refer to it
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "loginPage",
            Self::Inventory => "inventoryPage",
            Self::InventoryDetails => "inventoryDetailsPage",
            Self::Cart => "cartPage",
            Self::CheckoutInfo => "checkoutInfoPage",
            Self::CheckoutOverview => "checkoutOverviewPage",
            Self::CheckoutComplete => "checkoutCompletePage",
        }
    }
}

impl fmt::Display for PageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageRole {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ProbeError::Fixture {
                message: format!("unknown fixture `{s}`"),
            })
    }
}

/// How a page is prepared before a scenario gets it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Setup {
    /// Construct only
    #[default]
    Construct,
    /// Construct, then open the page's route on first request
    Navigate,
}

/// State of a fixture in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// Registered but never requested
    Registered,
    /// Handed out at least once
    SetUp,
    /// The setup recipe failed
    Failed,
}

/// A page object the registry knows how to build
#[async_trait]
pub trait FixturePage: Navigation + Sized + 'static {
    /// Role this page is registered under
    const ROLE: PageRole;

    /// Build the page over a session without touching the browser
    fn construct(session: &Session) -> Self;

    /// Open the page for [`Setup::Navigate`]
    async fn prepare(&self) -> ProbeResult<()> {
        self.navigate_to(self.route().path()).await?;
        self.wait_for_page_load().await
    }
}

#[async_trait]
impl FixturePage for LoginPage {
    const ROLE: PageRole = PageRole::Login;

    fn construct(session: &Session) -> Self {
        Self::new(session)
    }

    async fn prepare(&self) -> ProbeResult<()> {
        self.goto().await
    }
}

#[async_trait]
impl FixturePage for InventoryPage {
    const ROLE: PageRole = PageRole::Inventory;

    fn construct(session: &Session) -> Self {
        Self::new(session)
    }

    async fn prepare(&self) -> ProbeResult<()> {
        self.goto().await
    }
}

#[async_trait]
impl FixturePage for InventoryDetailsPage {
    const ROLE: PageRole = PageRole::InventoryDetails;

    fn construct(session: &Session) -> Self {
        Self::new(session)
    }
}

#[async_trait]
impl FixturePage for CartPage {
    const ROLE: PageRole = PageRole::Cart;

    fn construct(session: &Session) -> Self {
        Self::new(session)
    }

    async fn prepare(&self) -> ProbeResult<()> {
        self.goto().await
    }
}

#[async_trait]
impl FixturePage for CheckoutInfoPage {
    const ROLE: PageRole = PageRole::CheckoutInfo;

    fn construct(session: &Session) -> Self {
        Self::new(session)
    }
}

#[async_trait]
impl FixturePage for CheckoutOverviewPage {
    const ROLE: PageRole = PageRole::CheckoutOverview;

    fn construct(session: &Session) -> Self {
        Self::new(session)
    }
}

#[async_trait]
impl FixturePage for CheckoutCompletePage {
    const ROLE: PageRole = PageRole::CheckoutComplete;

    fn construct(session: &Session) -> Self {
        Self::new(session)
    }
}

/// Per-scenario fixture registry; clones share fixture state
#[derive(Debug, Clone)]
pub struct Fixtures {
    session: Session,
    recipes: HashMap<PageRole, Setup>,
    states: Arc<Mutex<HashMap<PageRole, FixtureState>>>,
}

impl Fixtures {
    /// Registry with the default recipes: login navigates, the rest construct
    #[must_use]
    pub fn new(session: Session) -> Self {
        let recipes = PageRole::ALL
            .into_iter()
            .map(|role| {
                let setup = if role == PageRole::Login {
                    Setup::Navigate
                } else {
                    Setup::Construct
                };
                (role, setup)
            })
            .collect();
        let states = PageRole::ALL
            .into_iter()
            .map(|role| (role, FixtureState::Registered))
            .collect();
        Self {
            session,
            recipes,
            states: Arc::new(Mutex::new(states)),
        }
    }

    /// Override the recipe for one role
    #[must_use]
    pub fn with_setup(mut self, role: PageRole, setup: Setup) -> Self {
        let _ = self.recipes.insert(role, setup);
        self
    }

    /// Recipe for a role
    #[must_use]
    pub fn setup(&self, role: PageRole) -> Setup {
        self.recipes.get(&role).copied().unwrap_or_default()
    }

    /// Current state of a role
    #[must_use]
    pub fn state(&self, role: PageRole) -> FixtureState {
        self.states
            .lock()
            .ok()
            .and_then(|states| states.get(&role).copied())
            .unwrap_or(FixtureState::Registered)
    }

    fn set_state(&self, role: PageRole, state: FixtureState) {
        if let Ok(mut states) = self.states.lock() {
            let _ = states.insert(role, state);
        }
    }

    /// Session every page is built over
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Build a page, running its recipe on first request
    pub async fn page<P: FixturePage>(&self) -> ProbeResult<P> {
        let role = P::ROLE;
        let page = P::construct(&self.session);
        let first_request = self.state(role) != FixtureState::SetUp;
        if first_request && self.setup(role) == Setup::Navigate {
            info!(fixture = %role, "preparing fixture");
            if let Err(e) = page.prepare().await {
                warn!(fixture = %role, error = %e, "fixture setup failed");
                self.set_state(role, FixtureState::Failed);
                return Err(e);
            }
        }
        debug!(fixture = %role, "fixture ready");
        self.set_state(role, FixtureState::SetUp);
        Ok(page)
    }

    /// `loginPage`
    pub async fn login_page(&self) -> ProbeResult<LoginPage> {
        self.page().await
    }

    /// `inventoryPage`
    pub async fn inventory_page(&self) -> ProbeResult<InventoryPage> {
        self.page().await
    }

    /// `inventoryDetailsPage`
    pub async fn inventory_details_page(&self) -> ProbeResult<InventoryDetailsPage> {
        self.page().await
    }

    /// `cartPage`
    pub async fn cart_page(&self) -> ProbeResult<CartPage> {
        self.page().await
    }

    /// `checkoutInfoPage`
    pub async fn checkout_info_page(&self) -> ProbeResult<CheckoutInfoPage> {
        self.page().await
    }

    /// `checkoutOverviewPage`
    pub async fn checkout_overview_page(&self) -> ProbeResult<CheckoutOverviewPage> {
        self.page().await
    }

    /// `checkoutCompletePage`
    pub async fn checkout_complete_page(&self) -> ProbeResult<CheckoutCompletePage> {
        self.page().await
    }
}
