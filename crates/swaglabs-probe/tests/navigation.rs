//! Routing, titles and unknown pages.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod support;

use support::{scenario, signed_in_scenario, Storefront};
use swaglabs_probe::prelude::*;

#[tokio::test]
async fn test_unknown_page_renders_empty_root() {
    scenario("404 page", Storefront::new(), |ctx| async move {
        let session = ctx.session();
        session.goto("/invalid-page-12345").await?;
        session.wait_for_load_state().await?;

        let body = session.locator("body").text_content().await?;
        assert_eq!(body.trim(), "You need to enable JavaScript to run this app.");
        assert_eq!(session.locator("#root").inner_html().await?, "");
        expect_title(session, TextMatch::exact("Swag Labs")).await?;
        assert_eq!(Route::from_url(&session.url().await?), None);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_every_route_keeps_the_title() {
    signed_in_scenario("titles", |ctx| async move {
        for route in Route::ALL {
            ctx.session().goto(route.path()).await?;
            expect_title(ctx.session(), "Swag Labs").await?;
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_signed_in_routes_resolve_to_their_page() {
    signed_in_scenario("route lookup", |ctx| async move {
        let session = ctx.session();
        for route in [Route::Inventory, Route::Cart, Route::CheckoutStepOne] {
            session.goto(route.path()).await?;
            assert_eq!(Route::from_url(&session.url().await?), Some(route));
        }
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_history_back_and_reload() {
    signed_in_scenario("history", |ctx| async move {
        let inventory = ctx.fixtures().inventory_page().await?;
        inventory.goto().await?;
        inventory.navigate_to_cart().await?;
        let cart = ctx.fixtures().cart_page().await?;
        assert!(cart.is_current().await?);

        cart.go_back().await?;
        assert!(inventory.is_current().await?);
        inventory.reload().await?;
        assert!(inventory.is_loaded().await?);
        Ok(())
    })
    .await;
}

#[tokio::test]
async fn test_page_objects_report_their_names() {
    signed_in_scenario("page names", |ctx| async move {
        let fixtures = ctx.fixtures();
        assert_eq!(fixtures.login_page().await?.page_name(), "LoginPage");
        assert_eq!(fixtures.cart_page().await?.page_name(), "CartPage");
        assert_eq!(
            fixtures.checkout_complete_page().await?.page_name(),
            "CheckoutCompletePage"
        );
        Ok(())
    })
    .await;
}
