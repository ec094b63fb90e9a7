//! Cart route handlers.
//!
//! The cart is stored in the visitor's session as item ids and quantities.
//! Mutations are plain form posts answered with a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use freshking_core::{Cart, MenuItemId};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::session::keys;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: &'static str,
    pub name: &'static str,
    pub image_url: &'static str,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .lines()
                .into_iter()
                .map(|line| CartItemView {
                    id: line.item.id,
                    name: line.item.name,
                    image_url: line.item.image_url,
                    quantity: line.quantity,
                    price: line.item.price().display(),
                    line_price: line.line_total.display(),
                })
                .collect(),
            subtotal: cart.total().display(),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart; empty if none has been saved.
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Save the visitor's cart.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

/// Cart badge count, treating session failures as an empty cart.
pub(crate) async fn cart_count(session: &Session) -> u32 {
    match load_cart(session).await {
        Ok(cart) => cart.item_count(),
        Err(e) => {
            tracing::warn!("Failed to load cart for badge: {e}");
            0
        }
    }
}

/// A same-site path to send the visitor back to, defaulting to the cart.
fn return_path(return_to: Option<&str>) -> String {
    return_to
        .map(str::trim)
        .filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
        .unwrap_or("/cart")
        .to_string()
}

// =============================================================================
// Forms & Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: String,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: u32,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;

    Ok(CartShowTemplate {
        cart_count: cart.item_count(),
        cart: CartView::from(&cart),
    })
}

/// Add an item to the cart.
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<AddToCartForm>) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await?;
    let id = MenuItemId::new(&form.item_id);
    let quantity = cart.add_quantity(&id, form.quantity.unwrap_or(1).max(1))?;
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("item_id", id.as_str())]));
    tracing::debug!(item_id = %id, quantity, "Cart updated");

    Ok(Redirect::to(&return_path(form.return_to.as_deref())))
}

/// Set an item's quantity; 0 removes it.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await?;
    cart.set_quantity(&MenuItemId::new(&form.item_id), form.quantity)?;
    save_cart(&session, &cart).await?;

    Ok(Redirect::to("/cart"))
}

/// Remove one unit of an item.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await?;
    cart.remove(&MenuItemId::new(&form.item_id));
    save_cart(&session, &cart).await?;

    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<impl IntoResponse> {
    save_cart(&session, &Cart::new()).await?;
    Ok(Redirect::to("/cart"))
}

/// Get cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: cart_count(&session).await,
    }
}
