//! Integration tests for pages, the cart and the checkout wizard.
//!
//! These drive the full router over HTTP with a cookie-keeping client, so
//! session persistence and redirects are exercised as a browser would.

use axum::http::StatusCode;
use freshking_integration_tests::TestContext;

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_health_and_response_headers() {
    let (ctx, _) = TestContext::scripted([]).await;

    let response = ctx
        .client
        .get(ctx.url("/health"))
        .header("x-request-id", "req-123")
        .send()
        .await
        .expect("GET /health");

    assert_eq!(response.status().as_u16(), 200);
    let headers = response.headers();
    assert_eq!(headers["x-request-id"], "req-123");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(
        headers["content-security-policy"]
            .to_str()
            .expect("ascii")
            .contains("img-src 'self' https://images.unsplash.com")
    );
    assert_eq!(response.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_home_page_lists_menu_and_locations() {
    let (ctx, _) = TestContext::scripted([]).await;

    let (status, html) = ctx.get_text("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Buddha Bowl"));
    assert!(html.contains("$12.99"));
    assert!(html.contains("FreshKing HafenCity"));
    assert!(html.contains(r#"id="chat-form""#));
}

#[tokio::test]
async fn test_rewards_and_investor_pages() {
    let (ctx, _) = TestContext::scripted([]).await;

    let (status, rewards) = ctx.get_text("/rewards").await;
    assert_eq!(status, StatusCode::OK);
    assert!(rewards.contains("FreshKing Rewards"));

    let (status, investors) = ctx.get_text("/investors").await;
    assert_eq!(status, StatusCode::OK);
    assert!(investors.contains("$1,000,000"));
    assert!(investors.contains("15% equity + Executive board"));
    assert!(investors.contains("Customer Retention Rate"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (ctx, _) = TestContext::scripted([]).await;
    let (status, _) = ctx.get_text("/menu/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_add_update_remove_clear() {
    let (ctx, _) = TestContext::scripted([]).await;
    assert!(ctx.cart_count().await.trim().is_empty());

    let (status, html) = ctx
        .post_form("/cart/add", &[("item_id", "poke-bowl"), ("quantity", "2")])
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Poke Bowl"));
    assert!(html.contains("$29.98"));

    ctx.post_form("/cart/add", &[("item_id", "green-goddess-smoothie"), ("return_to", "/#menu")])
        .await;
    assert!(ctx.cart_count().await.contains(">3<"));

    let (_, html) = ctx
        .post_form("/cart/update", &[("item_id", "poke-bowl"), ("quantity", "0")])
        .await;
    assert!(!html.contains("Poke Bowl"));
    assert!(ctx.cart_count().await.contains(">1<"));

    ctx.post_form("/cart/remove", &[("item_id", "green-goddess-smoothie")]).await;
    assert!(ctx.cart_count().await.trim().is_empty());

    ctx.post_form("/cart/add", &[("item_id", "buddha-bowl")]).await;
    let (_, html) = ctx.post_form("/cart/clear", &[]).await;
    assert!(html.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_cart_rejects_unknown_item() {
    let (ctx, _) = TestContext::scripted([]).await;

    let (status, _) = ctx.post_form("/cart/add", &[("item_id", "pizza")]).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(ctx.cart_count().await.trim().is_empty());
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let (ctx, _) = TestContext::scripted([]).await;
    ctx.post_form("/cart/add", &[("item_id", "poke-bowl")]).await;

    let other = TestContext::visitor();
    let badge = other
        .get(ctx.url("/cart/count"))
        .send()
        .await
        .expect("GET")
        .text()
        .await
        .expect("body");

    assert!(badge.trim().is_empty());
    assert!(ctx.cart_count().await.contains(">1<"));
}

// =============================================================================
// Checkout
// =============================================================================

async fn fill_contact_and_shipping(ctx: &TestContext) {
    let (status, html) = ctx
        .post_form(
            "/checkout/contact",
            &[
                ("first_name", "Ada"),
                ("last_name", "Lovelace"),
                ("email", "ada@example.com"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Shipping Address"));

    let (status, html) = ctx
        .post_form(
            "/checkout/shipping",
            &[
                ("address", "Jungfernstieg 1"),
                ("city", "Hamburg"),
                ("zip_code", "20354"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Payment Details"));
}

#[tokio::test]
async fn test_checkout_happy_path_clears_cart() {
    let (ctx, _) = TestContext::scripted([]).await;
    ctx.post_form("/cart/add", &[("item_id", "buddha-bowl"), ("quantity", "2")])
        .await;

    let (status, html) = ctx.get_text("/checkout").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Contact Information"));
    assert!(html.contains("$25.98"));
    assert!(html.contains("Free"));

    fill_contact_and_shipping(&ctx).await;

    let (status, html) = ctx
        .post_form(
            "/checkout/payment",
            &[
                ("card_number", "4242 4242 4242 4242"),
                ("expiry_date", "12/29"),
                ("cvv", "123"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Order Confirmed!"));
    assert!(html.contains("FK-"));
    assert!(html.contains("$25.98"));
    assert!(html.contains("Return to Home"));
    assert!(!html.contains("4242"));

    assert!(ctx.cart_count().await.trim().is_empty());

    // Nothing new in the cart: the confirmation stays
    let (_, html) = ctx.get_text("/checkout").await;
    assert!(html.contains("Order Confirmed!"));

    // A new order starts a fresh wizard
    ctx.post_form("/cart/add", &[("item_id", "poke-bowl")]).await;
    let (_, html) = ctx.get_text("/checkout").await;
    assert!(html.contains("Contact Information"));
}

#[tokio::test]
async fn test_checkout_rejects_missing_fields() {
    let (ctx, _) = TestContext::scripted([]).await;
    ctx.post_form("/cart/add", &[("item_id", "buddha-bowl")]).await;

    let (status, html) = ctx
        .post_form(
            "/checkout/contact",
            &[("first_name", "Ada"), ("last_name", "Lovelace"), ("email", "")],
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("Email is required"));
    assert!(html.contains(r#"value="Ada""#));
    assert!(html.contains("Contact Information"));
}

#[tokio::test]
async fn test_checkout_cannot_skip_steps() {
    let (ctx, _) = TestContext::scripted([]).await;

    let (status, html) = ctx
        .post_form(
            "/checkout/shipping",
            &[("address", "a"), ("city", "b"), ("zip_code", "c")],
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("Please complete the earlier steps before Shipping Address"));
}

#[tokio::test]
async fn test_checkout_payment_requires_items() {
    let (ctx, _) = TestContext::scripted([]).await;
    fill_contact_and_shipping(&ctx).await;

    let (status, html) = ctx
        .post_form(
            "/checkout/payment",
            &[("card_number", "4242"), ("expiry_date", "12/29"), ("cvv", "123")],
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_checkout_revisit_completed_step() {
    let (ctx, _) = TestContext::scripted([]).await;
    ctx.post_form("/cart/add", &[("item_id", "buddha-bowl")]).await;
    fill_contact_and_shipping(&ctx).await;

    let (status, html) = ctx.get_text("/checkout/step/contact").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Contact Information"));
    assert!(html.contains(r#"value="ada@example.com""#));

    let (status, _) = ctx.get_text("/checkout/step/bogus").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirmation_without_order_redirects_to_checkout() {
    let (ctx, _) = TestContext::scripted([]).await;
    let (status, html) = ctx.get_text("/checkout/confirmation").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Contact Information"));
}
