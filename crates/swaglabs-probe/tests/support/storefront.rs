//! Simulated Swag Labs storefront.
//!
//! Renders the same DOM contract as the live site (ids, `data-test`
//! attributes, placeholders and class names) and reproduces its observable
//! behaviour: login rules, cart badge, sorting, the checkout validation
//! messages, the sidebar, logged-out redirects and the empty 404 shell.

use std::collections::{BTreeMap, BTreeSet};
use swaglabs_probe::data::{errors, users, PASSWORD};
use swaglabs_probe::driver::{Document, Node, VirtualApp};
use swaglabs_probe::pages::SortOption;

const TITLE: &str = "Swag Labs";
const NOSCRIPT: &str = "You need to enable JavaScript to run this app.";
const TAX_RATE: f64 = 0.08;

#[derive(Debug, Clone, Copy)]
struct Product {
    id: u32,
    name: &'static str,
    description: &'static str,
    price_cents: u32,
}

impl Product {
    fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }

    fn price(&self) -> String {
        format_cents(self.price_cents)
    }
}

const CATALOG: [Product; 6] = [
    Product {
        id: 4,
        name: "Sauce Labs Backpack",
        description: "carry.allTheThings() with the sleek, streamlined Sly Pack.",
        price_cents: 2999,
    },
    Product {
        id: 0,
        name: "Sauce Labs Bike Light",
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night.",
        price_cents: 999,
    },
    Product {
        id: 1,
        name: "Sauce Labs Bolt T-Shirt",
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt.",
        price_cents: 1599,
    },
    Product {
        id: 5,
        name: "Sauce Labs Fleece Jacket",
        description: "It's not every day that you come across a midweight quarter-zip fleece jacket.",
        price_cents: 4999,
    },
    Product {
        id: 2,
        name: "Sauce Labs Onesie",
        description: "Rib snap infant onesie for the junior automation engineer in development.",
        price_cents: 799,
    },
    Product {
        id: 3,
        name: "Test.allTheThings() T-Shirt (Red)",
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests.",
        price_cents: 1599,
    },
];

fn format_cents(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

fn product_by_id(id: u32) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.id == id)
}

fn product_by_slug(slug: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.slug() == slug)
}

fn product_by_name(name: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.name == name.trim())
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((route, query)) => (route, Some(query)),
        None => (path, None),
    }
}

fn query_id(query: Option<&str>) -> Option<u32> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("id="))
        .and_then(|id| id.parse().ok())
}

/// The storefront application
#[derive(Debug, Clone, Default)]
pub struct Storefront {
    user: Option<String>,
    cart: BTreeSet<u32>,
    sort: SortOption,
    menu_open: bool,
    form: BTreeMap<String, String>,
    login_error: Option<String>,
    checkout_error: Option<String>,
    orders: usize,
}

impl Storefront {
    /// Logged-out storefront with an empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storefront whose session already belongs to `username`, as if a
    /// stored authentication state had been loaded
    #[must_use]
    pub fn signed_in(username: &str) -> Self {
        Self {
            user: Some(username.to_string()),
            ..Self::default()
        }
    }

    /// Completed orders so far
    #[must_use]
    pub const fn orders(&self) -> usize {
        self.orders
    }

    /// Reset per-screen state and move to `path`
    fn route_to(&mut self, path: &str) -> Option<String> {
        self.menu_open = false;
        self.sort = SortOption::default();
        self.form.clear();
        self.checkout_error = None;
        self.login_error = None;
        Some(path.to_string())
    }

    fn field(&self, id: &str) -> &str {
        self.form.get(id).map_or("", String::as_str)
    }

    fn submit_login(&mut self) -> Option<String> {
        let username = self.field("user-name").to_string();
        let password = self.field("password").to_string();
        let error = if username.is_empty() {
            Some(errors::USERNAME_REQUIRED)
        } else if password.is_empty() {
            Some(errors::PASSWORD_REQUIRED)
        } else if password != PASSWORD {
            Some(errors::INVALID_CREDENTIALS)
        } else if username == users::LOCKED_OUT.username {
            Some(errors::LOCKED_OUT)
        } else if users::ACCEPTED.iter().any(|u| u.username == username) {
            None
        } else {
            Some(errors::INVALID_CREDENTIALS)
        };
        if let Some(message) = error {
            self.login_error = Some(message.to_string());
            return None;
        }
        self.user = Some(username);
        self.route_to("/inventory.html")
    }

    fn submit_checkout_info(&mut self) -> Option<String> {
        let missing = if self.field("first-name").is_empty() {
            Some(errors::checkout::FIRST_NAME_REQUIRED)
        } else if self.field("last-name").is_empty() {
            Some(errors::checkout::LAST_NAME_REQUIRED)
        } else if self.field("postal-code").is_empty() {
            Some(errors::checkout::POSTAL_CODE_REQUIRED)
        } else {
            None
        };
        if let Some(message) = missing {
            self.checkout_error = Some(format!("Error: {message}"));
            return None;
        }
        self.route_to("/checkout-step-two.html")
    }

    fn sorted_catalog(&self) -> Vec<&'static Product> {
        let mut products: Vec<&Product> = CATALOG.iter().collect();
        products.sort_by(|a, b| a.name.cmp(b.name));
        match self.sort {
            SortOption::NameAscending => {}
            SortOption::NameDescending => products.reverse(),
            SortOption::PriceAscending => products.sort_by_key(|p| p.price_cents),
            SortOption::PriceDescending => {
                products.sort_by_key(|p| std::cmp::Reverse(p.price_cents));
            }
        }
        products
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn document(root_children: Vec<Node>) -> Document {
        Document::new(
            TITLE,
            Node::element("body").children([
                Node::element("noscript").text(NOSCRIPT).hidden(),
                Node::element("div").id("root").children(root_children),
            ]),
        )
    }

    fn input(&self, id: &str, test_id: &str, placeholder: &str, kind: &str) -> Node {
        Node::element("input")
            .id(id)
            .class("input_error form_input")
            .attr("data-test", test_id)
            .attr("placeholder", placeholder)
            .attr("type", kind)
            .attr("value", self.field(id))
    }

    fn error_banner(message: &str) -> Node {
        Node::element("div")
            .class("error-message-container error")
            .child(
                Node::element("h3")
                    .attr("data-test", "error")
                    .text(message)
                    .child(Node::element("button").class("error-button").attr("data-test", "error-button")),
            )
    }

    fn render_login(&self) -> Document {
        let mut form = Node::element("form").children([
            Node::element("div")
                .class("form_group")
                .child(self.input("user-name", "username", "Username", "text")),
            Node::element("div")
                .class("form_group")
                .child(self.input("password", "password", "Password", "password")),
        ]);
        if let Some(message) = &self.login_error {
            form = form.child(Self::error_banner(message));
        }
        form = form.child(
            Node::element("input")
                .id("login-button")
                .class("submit-button btn_action")
                .attr("data-test", "login-button")
                .attr("type", "submit")
                .attr("value", "Login"),
        );
        Self::document(vec![Node::element("div").class("login_container").children([
            Node::element("div").class("login_logo").text(TITLE),
            Node::element("div").class("login_wrapper").child(form),
        ])])
    }

    fn header(&self, title: &str, secondary: Vec<Node>) -> Node {
        let mut menu = Node::element("div").class("bm-menu-wrap").child(
            Node::element("div").class("bm-menu").child(
                Node::element("nav").class("bm-item-list").children([
                    sidebar_link("inventory_sidebar_link", "All Items"),
                    sidebar_link("about_sidebar_link", "About"),
                    sidebar_link("logout_sidebar_link", "Logout"),
                    sidebar_link("reset_sidebar_link", "Reset App State"),
                ]),
            ),
        );
        if !self.menu_open {
            menu = menu.attr("aria-hidden", "true").hidden();
        }
        let mut cart_link = Node::element("a")
            .class("shopping_cart_link")
            .attr("data-test", "shopping-cart-link");
        if !self.cart.is_empty() {
            cart_link = cart_link.child(
                Node::element("span")
                    .class("shopping_cart_badge")
                    .attr("data-test", "shopping-cart-badge")
                    .text(self.cart.len().to_string()),
            );
        }
        let mut secondary_container = Node::element("div")
            .class("header_secondary_container")
            .child(Node::element("span").class("title").attr("data-test", "title").text(title));
        for node in secondary {
            secondary_container = secondary_container.child(node);
        }
        Node::element("div").id("header_container").class("header_container").children([
            Node::element("div").class("primary_header").children([
                Node::element("div").id("menu_button_container").children([
                    Node::element("div").class("bm-burger-button").child(
                        Node::element("button")
                            .id("react-burger-menu-btn")
                            .text("Open Menu"),
                    ),
                    menu,
                ]),
                Node::element("div").class("app_logo").text(TITLE),
                Node::element("div").id("shopping_cart_container").child(cart_link),
            ]),
            secondary_container,
        ])
    }

    fn page(&self, title: &str, secondary: Vec<Node>, content: Node) -> Document {
        Self::document(vec![Node::element("div").id("page_wrapper").class("page_wrapper").child(
            Node::element("div").id("contents_wrapper").children([self.header(title, secondary), content]),
        )])
    }

    fn cart_button(&self, product: &Product, details: bool) -> Node {
        let (prefix, label) = if self.cart.contains(&product.id) {
            ("remove", "Remove")
        } else {
            ("add-to-cart", "Add to cart")
        };
        let id = if details {
            prefix.to_string()
        } else {
            format!("{prefix}-{}", product.slug())
        };
        Node::element("button")
            .id(id.clone())
            .class("btn btn_inventory")
            .attr("data-test", id)
            .attr("name", prefix)
            .text(label)
    }

    fn render_inventory(&self) -> Document {
        let sort = Node::element("div").class("right_component").child(
            Node::element("span").class("select_container").children([
                Node::element("span")
                    .class("active_option")
                    .attr("data-test", "active-option")
                    .text(self.sort.label()),
                Node::element("select")
                    .class("product_sort_container")
                    .attr("data-test", "product-sort-container")
                    .attr("value", self.sort.value())
                    .children(SortOption::ALL.map(|option| {
                        Node::element("option")
                            .attr("value", option.value())
                            .text(option.label())
                    })),
            ]),
        );
        let items = self.sorted_catalog().into_iter().map(|product| {
            Node::element("div")
                .class("inventory_item")
                .attr("data-test", "inventory-item")
                .children([
                    Node::element("div").class("inventory_item_img"),
                    Node::element("div").class("inventory_item_description").children([
                        Node::element("div").class("inventory_item_label").children([
                            Node::element("a")
                                .id(format!("item_{}_title_link", product.id))
                                .attr("href", "#")
                                .child(
                                    Node::element("div")
                                        .class("inventory_item_name")
                                        .attr("data-test", "inventory-item-name")
                                        .text(product.name),
                                ),
                            Node::element("div")
                                .class("inventory_item_desc")
                                .text(product.description),
                        ]),
                        Node::element("div").class("pricebar").children([
                            Node::element("div")
                                .class("inventory_item_price")
                                .attr("data-test", "inventory-item-price")
                                .text(product.price()),
                            self.cart_button(product, false),
                        ]),
                    ]),
                ])
        });
        let content = Node::element("div")
            .id("inventory_container")
            .class("inventory_container")
            .child(Node::element("div").class("inventory_list").children(items));
        self.page("Products", vec![sort], content)
    }

    fn render_details(&self, id: Option<u32>) -> Document {
        let back = Node::element("button")
            .id("back-to-products")
            .attr("data-test", "back-to-products")
            .text("Back to products");
        let body = match id.and_then(product_by_id) {
            Some(product) => vec![
                Node::element("div")
                    .class("inventory_details_name large_size")
                    .attr("data-test", "inventory-item-name")
                    .text(product.name),
                Node::element("div")
                    .class("inventory_details_desc large_size")
                    .text(product.description),
                Node::element("div")
                    .class("inventory_details_price")
                    .attr("data-test", "inventory-item-price")
                    .text(product.price()),
                self.cart_button(product, true),
            ],
            None => vec![
                Node::element("div")
                    .class("inventory_details_name large_size")
                    .attr("data-test", "inventory-item-name")
                    .text("ITEM NOT FOUND"),
                Node::element("div")
                    .class("inventory_details_desc large_size")
                    .text("We're sorry, but your call could not be completed as dialled."),
            ],
        };
        let content = Node::element("div").class("inventory_details").child(
            Node::element("div")
                .class("inventory_details_container")
                .child(Node::element("div").class("inventory_details_desc_container").children(body)),
        );
        self.page("", vec![back], content)
    }

    fn cart_rows(&self, with_remove: bool) -> Vec<Node> {
        self.cart
            .iter()
            .filter_map(|id| product_by_id(*id))
            .map(|product| {
                let mut pricebar = Node::element("div").class("item_pricebar").child(
                    Node::element("div")
                        .class("inventory_item_price")
                        .attr("data-test", "inventory-item-price")
                        .text(product.price()),
                );
                if with_remove {
                    pricebar = pricebar.child(self.cart_button(product, false));
                }
                Node::element("div")
                    .class("cart_item")
                    .attr("data-test", "inventory-item")
                    .children([
                        Node::element("div").class("cart_quantity").text("1"),
                        Node::element("div").class("cart_item_label").children([
                            Node::element("a")
                                .id(format!("item_{}_title_link", product.id))
                                .attr("href", "#")
                                .child(
                                    Node::element("div")
                                        .class("inventory_item_name")
                                        .attr("data-test", "inventory-item-name")
                                        .text(product.name),
                                ),
                            pricebar,
                        ]),
                    ])
            })
            .collect()
    }

    fn cart_list(&self, with_remove: bool) -> Node {
        let mut list = Node::element("div").class("cart_list").children([
            Node::element("div").class("cart_quantity_label").text("QTY"),
            Node::element("div").class("cart_desc_label").text("Description"),
        ]);
        for row in self.cart_rows(with_remove) {
            list = list.child(row);
        }
        list
    }

    fn render_cart(&self) -> Document {
        let content = Node::element("div").id("cart_contents_container").children([
            self.cart_list(true),
            Node::element("div").class("cart_footer").children([
                Node::element("button")
                    .id("continue-shopping")
                    .attr("data-test", "continue-shopping")
                    .text("Continue Shopping"),
                Node::element("button")
                    .id("checkout")
                    .attr("data-test", "checkout")
                    .text("Checkout"),
            ]),
        ]);
        self.page("Your Cart", Vec::new(), content)
    }

    fn render_checkout_info(&self) -> Document {
        let mut info = Node::element("div").class("checkout_info").children([
            self.input("first-name", "firstName", "First Name", "text"),
            self.input("last-name", "lastName", "Last Name", "text"),
            self.input("postal-code", "postalCode", "Zip/Postal Code", "text"),
        ]);
        if let Some(message) = &self.checkout_error {
            info = info.child(Self::error_banner(message));
        }
        let form = Node::element("form").children([
            info,
            Node::element("div").class("checkout_buttons").children([
                Node::element("button")
                    .id("cancel")
                    .attr("data-test", "cancel")
                    .text("Cancel"),
                Node::element("input")
                    .id("continue")
                    .attr("data-test", "continue")
                    .attr("type", "submit")
                    .attr("value", "Continue"),
            ]),
        ]);
        let content = Node::element("div")
            .id("checkout_info_container")
            .class("checkout_info_container")
            .child(Node::element("div").class("checkout_info_wrapper").child(form));
        self.page("Checkout: Your Information", Vec::new(), content)
    }

    fn render_checkout_overview(&self) -> Document {
        let subtotal: u32 = self
            .cart
            .iter()
            .filter_map(|id| product_by_id(*id))
            .map(|p| p.price_cents)
            .sum();
        let tax = (f64::from(subtotal) * TAX_RATE).round() as u32;
        let summary = Node::element("div").class("summary_info").children([
            Node::element("div").class("summary_info_label").text("Payment Information:"),
            Node::element("div").class("summary_value_label").text("SauceCard #31337"),
            Node::element("div").class("summary_info_label").text("Shipping Information:"),
            Node::element("div")
                .class("summary_value_label")
                .text("Free Pony Express Delivery!"),
            Node::element("div")
                .class("summary_subtotal_label")
                .text(format!("Item total: {}", format_cents(subtotal))),
            Node::element("div")
                .class("summary_tax_label")
                .text(format!("Tax: {}", format_cents(tax))),
            Node::element("div")
                .class("summary_total_label")
                .attr("data-test", "total-label")
                .text(format!("Total: {}", format_cents(subtotal + tax))),
            Node::element("div").class("cart_footer").children([
                Node::element("button")
                    .id("cancel")
                    .attr("data-test", "cancel")
                    .text("Cancel"),
                Node::element("button")
                    .id("finish")
                    .attr("data-test", "finish")
                    .text("Finish"),
            ]),
        ]);
        let content = Node::element("div")
            .id("checkout_summary_container")
            .child(Node::element("div").class("checkout_summary_container").children([
                self.cart_list(false),
                summary,
            ]));
        self.page("Checkout: Overview", Vec::new(), content)
    }

    fn render_checkout_complete(&self) -> Document {
        let content = Node::element("div")
            .id("checkout_complete_container")
            .class("checkout_complete_container")
            .children([
                Node::element("img").class("pony_express").attr("alt", "Pony Express"),
                Node::element("h2")
                    .class("complete-header")
                    .attr("data-test", "complete-header")
                    .text("Thank you for your order!"),
                Node::element("div").class("complete-text").attr("data-test", "complete-text").text(
                    "Your order has been dispatched, and will arrive just as fast as the pony can get there!",
                ),
                Node::element("button")
                    .id("back-to-products")
                    .attr("data-test", "back-to-products")
                    .text("Back Home"),
            ]);
        self.page("Checkout: Complete!", Vec::new(), content)
    }
}

fn sidebar_link(id: &str, label: &str) -> Node {
    Node::element("a")
        .id(id)
        .class("bm-item menu-item")
        .attr("data-test", id.replace('_', "-"))
        .attr("href", "#")
        .text(label)
}

const PROTECTED: [&str; 6] = [
    "/inventory.html",
    "/inventory-item.html",
    "/cart.html",
    "/checkout-step-one.html",
    "/checkout-step-two.html",
    "/checkout-complete.html",
];

impl VirtualApp for Storefront {
    fn navigate(&mut self, path: &str) -> String {
        let (route, _) = split_path(path);
        if self.user.is_none() && PROTECTED.contains(&route) {
            let message =
                format!("Epic sadface: You can only access '{route}' when you are logged in.");
            let _ = self.route_to("/");
            self.login_error = Some(message);
            return "/".to_string();
        }
        let _ = self.route_to(path);
        path.to_string()
    }

    fn render(&self, path: &str) -> Document {
        let (route, query) = split_path(path);
        match route {
            "/" | "" => self.render_login(),
            "/inventory.html" => self.render_inventory(),
            "/inventory-item.html" => self.render_details(query_id(query)),
            "/cart.html" => self.render_cart(),
            "/checkout-step-one.html" => self.render_checkout_info(),
            "/checkout-step-two.html" => self.render_checkout_overview(),
            "/checkout-complete.html" => self.render_checkout_complete(),
            _ => Self::document(Vec::new()),
        }
    }

    fn click(&mut self, path: &str, target: &Node) -> Option<String> {
        let (route, query) = split_path(path);
        let id = target.get("id").unwrap_or_default();

        if target.has_class("inventory_item_name") {
            let product = product_by_name(&target.text_content())?;
            return self.route_to(&format!("/inventory-item.html?id={}", product.id));
        }
        if target.get("data-test") == Some("shopping-cart-link") {
            return self.route_to("/cart.html");
        }
        if let Some(slug) = id.strip_prefix("add-to-cart-") {
            let product = product_by_slug(slug)?;
            self.cart.insert(product.id);
            return None;
        }
        if let Some(slug) = id.strip_prefix("remove-") {
            let product = product_by_slug(slug)?;
            self.cart.remove(&product.id);
            return None;
        }
        if let Some(rest) = id.strip_prefix("item_") {
            let product_id = rest.strip_suffix("_title_link")?.parse::<u32>().ok()?;
            return self.route_to(&format!("/inventory-item.html?id={product_id}"));
        }

        match (route, id) {
            (_, "login-button") => self.submit_login(),
            (_, "react-burger-menu-btn") => {
                self.menu_open = true;
                None
            }
            (_, "inventory_sidebar_link") => self.route_to("/inventory.html"),
            (_, "reset_sidebar_link") => {
                self.cart.clear();
                None
            }
            (_, "logout_sidebar_link") => {
                self.user = None;
                self.route_to("/")
            }
            ("/inventory-item.html", "add-to-cart") => {
                self.cart.insert(query_id(query)?);
                None
            }
            ("/inventory-item.html", "remove") => {
                self.cart.remove(&query_id(query)?);
                None
            }
            (_, "back-to-products" | "continue-shopping") => self.route_to("/inventory.html"),
            ("/cart.html", "checkout") => self.route_to("/checkout-step-one.html"),
            ("/checkout-step-one.html", "continue") => self.submit_checkout_info(),
            ("/checkout-step-one.html", "cancel") => self.route_to("/cart.html"),
            ("/checkout-step-two.html", "cancel") => self.route_to("/inventory.html"),
            ("/checkout-step-two.html", "finish") => {
                self.cart.clear();
                self.orders += 1;
                self.route_to("/checkout-complete.html")
            }
            _ => {
                if target.has_class("error-button") {
                    self.login_error = None;
                    self.checkout_error = None;
                }
                None
            }
        }
    }

    fn fill(&mut self, _path: &str, target: &Node, value: &str) {
        if let Some(id) = target.get("id") {
            self.form.insert(id.to_string(), value.to_string());
        }
    }

    fn select(&mut self, _path: &str, target: &Node, value: &str) -> Option<String> {
        if target.get("data-test") == Some("product-sort-container") {
            if let Ok(option) = value.parse::<SortOption>() {
                self.sort = option;
            }
        }
        None
    }
}
