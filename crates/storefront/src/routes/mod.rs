//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page (hero, menu, story, mission, locations)
//! GET  /health                   - Health check
//!
//! # Cart
//! GET  /cart                     - Cart page
//! POST /cart/add                 - Add an item (form: item_id[, quantity][, return_to])
//! POST /cart/update              - Set quantity, 0 removes (form: item_id, quantity)
//! POST /cart/remove              - Remove one unit (form: item_id)
//! POST /cart/clear               - Empty the cart
//! GET  /cart/count               - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                 - Wizard at the current step
//! GET  /checkout/step/{step}     - Revisit a completed step
//! POST /checkout/contact         - Submit step 1
//! POST /checkout/shipping        - Submit step 2
//! POST /checkout/payment         - Submit step 3 and place the order
//! GET  /checkout/confirmation    - Order confirmation
//!
//! # Pages
//! GET  /rewards                  - Rewards program
//! GET  /investors                - Investor relations
//!
//! # Chat (JSON + SSE, rate limited)
//! GET    /chat/messages          - Displayable transcript and busy flag
//! POST   /chat/messages          - Send a user turn
//! POST   /chat/cancel            - Cancel the outstanding reply
//! DELETE /chat                   - Reset the conversation
//! GET    /chat/reveal            - Typing effect stream for the newest reply
//! ```

pub mod cart;
pub mod chat;
pub mod checkout;
pub mod home;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::chat_rate_limiter;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/step/{step}", get(checkout::revisit))
        .route("/contact", post(checkout::submit_contact))
        .route("/shipping", post(checkout::submit_shipping))
        .route("/payment", post(checkout::submit_payment))
        .route("/confirmation", get(checkout::confirmation))
}

/// Create the chat API router.
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::delete(chat::reset))
        .route("/messages", get(chat::messages).post(chat::send))
        .route("/cancel", post(chat::cancel))
        .route("/reveal", get(chat::reveal))
        .layer(chat_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout wizard
        .nest("/checkout", checkout_routes())
        // Static pages
        .merge(pages::router())
        // Chat API
        .nest("/chat", chat_routes())
}
