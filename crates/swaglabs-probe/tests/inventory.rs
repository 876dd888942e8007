//! Product listing and product details scenarios.
//!
//! Every scenario starts signed in, with the inventory fixture switched to
//! navigate so the listing is open before the body runs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod support;

use support::{config, Storefront};
use swaglabs_probe::prelude::*;

async fn on_inventory<F, Fut>(name: &str, body: F) -> ScenarioReport
where
    F: FnOnce(TestContext, InventoryPage) -> Fut,
    Fut: std::future::Future<Output = ProbeResult<()>>,
{
    let dir = tempfile::tempdir().unwrap();
    let ctx = TestContext::memory(
        name,
        Storefront::signed_in(users::STANDARD.username),
        config(dir.path()),
    )
    .with_setup(PageRole::Inventory, Setup::Navigate);
    run_scenario(ctx, |ctx| async move {
        let inventory = ctx.fixtures().inventory_page().await?;
        body(ctx, inventory).await
    })
    .await
    .unwrap_or_else(|e| panic!("scenario `{name}` failed: {e}"))
}

fn sorted_by(mut values: Vec<f64>, descending: bool) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    if descending {
        values.reverse();
    }
    values
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_listing_shows_six_products() {
    on_inventory("six products", |_ctx, inventory| async move {
        assert_eq!(inventory.item_count().await?, 6);
        expect_locator(inventory.items()).to_have_count(6).await
    })
    .await;
}

#[tokio::test]
async fn test_every_product_has_name_and_positive_price() {
    on_inventory("names and prices", |_ctx, inventory| async move {
        let names = inventory.product_names().await?;
        let prices = inventory.product_prices().await?;
        assert_eq!(names.len(), 6);
        assert_eq!(prices.len(), 6);
        assert!(names.iter().all(|n| !n.is_empty()));
        assert!(
            prices.iter().all(|p| p.is_finite() && *p > 0.0),
            "{prices:?}"
        );
        for expected in products::ALL {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_default_order_is_name_ascending() {
    on_inventory("default order", |_ctx, inventory| async move {
        let names = inventory.product_names().await?;
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        Ok(())
    })
    .await;
}

// ============================================================================
// Sorting
// ============================================================================

#[tokio::test]
async fn test_sort_price_low_to_high() {
    on_inventory("sort lohi", |_ctx, inventory| async move {
        inventory.select_sort(SortOption::PriceAscending).await?;
        let prices = inventory.product_prices().await?;
        assert_eq!(prices, sorted_by(prices.clone(), false));
        assert_eq!(prices.first().copied(), Some(7.99));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_sort_price_high_to_low() {
    on_inventory("sort hilo", |_ctx, inventory| async move {
        inventory.select_sort(SortOption::PriceDescending).await?;
        let prices = inventory.product_prices().await?;
        assert_eq!(prices, sorted_by(prices.clone(), true));
        assert_eq!(prices.first().copied(), Some(49.99));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_sort_name_z_to_a() {
    on_inventory("sort za", |_ctx, inventory| async move {
        inventory.select_sort(SortOption::NameDescending).await?;
        let names = inventory.product_names().await?;
        let mut expected = names.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(names, expected);
        assert_eq!(names.first().map(String::as_str), Some(products::RED_T_SHIRT));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_sort_keeps_every_product() {
    for option in SortOption::ALL {
        on_inventory(&format!("sort {option}"), |_ctx, inventory| async move {
            inventory.select_sort(option).await?;
            let mut names = inventory.product_names().await?;
            names.sort();
            let mut expected: Vec<String> = products::ALL.iter().map(|n| (*n).to_string()).collect();
            expected.sort();
            assert_eq!(names, expected);
            Ok(())
        })
        .await;
    }
}

#[tokio::test]
async fn test_reload_resets_sort() {
    on_inventory("reload resets sort", |_ctx, inventory| async move {
        inventory.select_sort(SortOption::PriceDescending).await?;
        inventory.reload().await?;
        let names = inventory.product_names().await?;
        assert_eq!(names.first().map(String::as_str), Some(products::BACKPACK));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_back_after_details_resets_sort() {
    on_inventory("back resets sort", |ctx, inventory| async move {
        inventory.select_sort(SortOption::PriceAscending).await?;
        inventory.open_product_details(products::ONESIE).await?;
        let details = ctx.fixtures().inventory_details_page().await?;
        assert!(details.is_loaded().await?);
        ctx.session().go_back().await?;

        expect_url(ctx.session(), r".*/inventory\.html$").await?;
        let names = inventory.product_names().await?;
        assert_eq!(names.first().map(String::as_str), Some(products::BACKPACK));
        Ok(())
    })
    .await;
}

// ============================================================================
// Cart toggles
// ============================================================================

#[tokio::test]
async fn test_add_button_toggles_to_remove() {
    on_inventory("toggle button", |_ctx, inventory| async move {
        assert_eq!(inventory.add_button_text(products::BACKPACK).await?, "Add to cart");
        inventory.add_product_to_cart(products::BACKPACK).await?;
        assert_eq!(inventory.add_button_text(products::BACKPACK).await?, "Remove");
        assert_eq!(inventory.cart_badge_count().await?, 1);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_rapid_add_remove_then_back_keeps_cart() {
    on_inventory("rapid toggles", |ctx, inventory| async move {
        let session = ctx.session();
        for name in [products::BACKPACK, products::BIKE_LIGHT, products::ONESIE] {
            inventory.add_product_to_cart(name).await?;
        }
        session.locator("#remove-sauce-labs-bike-light").click().await?;
        inventory.add_product_to_cart(products::BIKE_LIGHT).await?;
        session.locator("#remove-sauce-labs-onesie").click().await?;

        inventory.open_product_details(products::BACKPACK).await?;
        session.go_back().await?;
        assert_eq!(inventory.cart_badge_count().await?, 2);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_reset_app_state_empties_cart() {
    on_inventory("reset state", |ctx, inventory| async move {
        inventory.add_product_to_cart(products::FLEECE_JACKET).await?;
        inventory.open_sidebar_menu().await?;
        ctx.session().locator("#reset_sidebar_link").click().await?;
        expect_locator(inventory.shell().cart_badge())
            .to_be_hidden()
            .await?;
        assert_eq!(inventory.cart_badge_count().await?, 0);
        Ok(())
    })
    .await;
}

// ============================================================================
// Details
// ============================================================================

#[tokio::test]
async fn test_details_show_selected_product() {
    on_inventory("open details", |ctx, inventory| async move {
        inventory.open_product_details(products::BOLT_T_SHIRT).await?;
        let details = ctx.fixtures().inventory_details_page().await?;
        assert!(details.is_loaded().await?);
        assert!(details.is_current().await?);
        assert_eq!(details.product_name().await?, products::BOLT_T_SHIRT);
        let url = details.current_url().await?;
        assert_eq!(query_param(&url, "id"), Some("1"));
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_title_link_opens_details_by_id() {
    on_inventory("title link", |ctx, _inventory| async move {
        ctx.session().locator("#item_4_title_link").click().await?;
        expect_url(ctx.session(), r".*/inventory-item\.html\?id=4$").await?;
        let details = ctx.fixtures().inventory_details_page().await?;
        assert_eq!(details.product_name().await?, products::BACKPACK);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_details_add_and_remove() {
    on_inventory("details add remove", |ctx, inventory| async move {
        inventory.open_product_details(products::BACKPACK).await?;
        let details = ctx.fixtures().inventory_details_page().await?;
        details.click_add_to_cart().await?;
        assert_eq!(details.cart_badge_count().await?, 1);
        details.click_remove().await?;
        assert!(!details.is_cart_badge_visible().await?);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_details_back_to_products() {
    on_inventory("details back", |ctx, inventory| async move {
        inventory.open_product_details(products::FLEECE_JACKET).await?;
        let details = ctx.fixtures().inventory_details_page().await?;
        details.click_add_to_cart().await?;
        details.go_back().await?;

        expect_url(ctx.session(), r".*/inventory\.html$").await?;
        assert!(inventory.is_loaded().await?);
        assert_eq!(inventory.add_button_text(products::FLEECE_JACKET).await?, "Remove");
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_unknown_product_id_shows_not_found() {
    on_inventory("invalid id", |ctx, _inventory| async move {
        let details = ctx.fixtures().inventory_details_page().await?;
        details.navigate_to("/inventory-item.html?id=999").await?;
        expect_url(ctx.session(), r"id=999").await?;
        assert_eq!(details.product_name().await?, "ITEM NOT FOUND");
        let add = ctx.session().locator(r#"button[id^="add-to-cart"]"#);
        expect_locator(&add).to_have_count(0).await
    })
    .await;
}

#[tokio::test]
async fn test_listing_screenshot_is_saved() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("shots/inventory.png");
    let shot = target.clone();
    on_inventory("screenshot", |_ctx, inventory| async move {
        let bytes = inventory.take_screenshot(&shot).await?;
        assert!(!bytes.is_empty());
        Ok(())
    })
    .await;
    assert!(target.exists());
}

// ============================================================================
// Property: the last sort selection wins
// ============================================================================

mod sort_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_last_selection_decides_order(picks in prop::collection::vec(0usize..4, 1..5)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let options: Vec<SortOption> = picks.iter().map(|i| SortOption::ALL[*i]).collect();
            let last = *options.last().unwrap();
            runtime.block_on(on_inventory("sort sequence", |_ctx, inventory| async move {
                for option in options {
                    inventory.select_sort(option).await?;
                }
                let names = inventory.product_names().await?;
                let prices = inventory.product_prices().await?;
                let mut sorted_names = names.clone();
                sorted_names.sort();
                match last {
                    SortOption::NameAscending => assert_eq!(names, sorted_names),
                    SortOption::NameDescending => {
                        sorted_names.reverse();
                        assert_eq!(names, sorted_names);
                    }
                    SortOption::PriceAscending => {
                        assert_eq!(prices, sorted_by(prices.clone(), false));
                    }
                    SortOption::PriceDescending => {
                        assert_eq!(prices, sorted_by(prices.clone(), true));
                    }
                }
                Ok(())
            }));
        }
    }
}
