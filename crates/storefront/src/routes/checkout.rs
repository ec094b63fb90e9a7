//! Checkout route handlers.
//!
//! Wizard progress is kept in the session under [`keys::CHECKOUT`]. Every
//! submission redirects back to `/checkout`, which renders the current step;
//! a rejected submission re-renders the step with the error instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use freshking_core::{Cart, CheckoutStep};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::session::keys;
use crate::routes::cart::{CartView, load_cart, save_cart};
use crate::services::checkout::{
    CheckoutError, CheckoutWizard, ConfirmedOrder, ContactForm, PaymentForm, ShippingForm,
    place_order,
};
use crate::state::AppState;

const WIZARD_STEPS: [CheckoutStep; 3] = [
    CheckoutStep::Contact,
    CheckoutStep::Shipping,
    CheckoutStep::Payment,
];

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_wizard(session: &Session) -> Result<CheckoutWizard> {
    Ok(session
        .get::<CheckoutWizard>(keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

async fn save_wizard(session: &Session, wizard: &CheckoutWizard) -> Result<()> {
    session.insert(keys::CHECKOUT, wizard).await?;
    Ok(())
}

// =============================================================================
// Templates
// =============================================================================

/// Progress indicator entry.
pub struct StepLink {
    pub number: u8,
    pub title: &'static str,
    pub slug: &'static str,
    pub is_current: bool,
    /// Completed steps link back to themselves.
    pub is_done: bool,
}

/// Checkout wizard template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub step_slug: &'static str,
    pub step_title: &'static str,
    pub steps: Vec<StepLink>,
    pub contact: ContactForm,
    pub shipping: ShippingForm,
    pub error: Option<String>,
    pub cart: CartView,
    pub cart_count: u32,
}

impl CheckoutTemplate {
    fn new(wizard: &CheckoutWizard, cart: &Cart) -> Self {
        let current = wizard.current();
        let furthest = wizard.furthest();

        Self {
            step_slug: current.slug(),
            step_title: current.title(),
            steps: WIZARD_STEPS
                .into_iter()
                .map(|step| StepLink {
                    number: step.number(),
                    title: step.title(),
                    slug: step.slug(),
                    is_current: step == current,
                    is_done: step < furthest && step != current,
                })
                .collect(),
            contact: wizard.contact().cloned().unwrap_or_default(),
            shipping: wizard.shipping().cloned().unwrap_or_default(),
            error: None,
            cart: CartView::from(cart),
            cart_count: cart.item_count(),
        }
    }

    fn with_error(mut self, error: &CheckoutError) -> Response {
        self.error = Some(error.to_string());
        (StatusCode::UNPROCESSABLE_ENTITY, self).into_response()
    }
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order: ConfirmedOrder,
    pub cart_count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the wizard at its current step.
///
/// A confirmed order stays on the confirmation page until the visitor puts
/// something new in the cart, which starts a fresh checkout.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Response> {
    let cart = load_cart(&session).await?;
    let mut wizard = load_wizard(&session).await?;

    if wizard.is_confirmed() {
        if cart.is_empty() {
            return Ok(Redirect::to("/checkout/confirmation").into_response());
        }
        wizard = CheckoutWizard::default();
        save_wizard(&session, &wizard).await?;
    }

    Ok(CheckoutTemplate::new(&wizard, &cart).into_response())
}

/// Go back to a completed step.
///
/// # Errors
///
/// Returns 404 for an unknown step name.
#[instrument(skip(session))]
pub async fn revisit(session: Session, Path(step): Path<String>) -> Result<Response> {
    let step: CheckoutStep = step.parse().map_err(AppError::NotFound)?;
    let mut wizard = load_wizard(&session).await?;

    match wizard.revisit(step) {
        Ok(()) => save_wizard(&session, &wizard).await?,
        Err(e) => tracing::debug!("Ignoring revisit: {e}"),
    }

    Ok(Redirect::to("/checkout").into_response())
}

/// Submit step 1.
#[instrument(skip(session, form))]
pub async fn submit_contact(session: Session, Form(form): Form<ContactForm>) -> Result<Response> {
    let mut wizard = load_wizard(&session).await?;

    if let Err(e) = wizard.submit_contact(&form) {
        let cart = load_cart(&session).await?;
        let mut page = CheckoutTemplate::new(&wizard, &cart);
        page.contact = form;
        return Ok(page.with_error(&e));
    }

    save_wizard(&session, &wizard).await?;
    Ok(Redirect::to("/checkout").into_response())
}

/// Submit step 2.
#[instrument(skip(session, form))]
pub async fn submit_shipping(session: Session, Form(form): Form<ShippingForm>) -> Result<Response> {
    let mut wizard = load_wizard(&session).await?;

    if let Err(e) = wizard.submit_shipping(&form) {
        let cart = load_cart(&session).await?;
        let mut page = CheckoutTemplate::new(&wizard, &cart);
        page.shipping = form;
        return Ok(page.with_error(&e));
    }

    save_wizard(&session, &wizard).await?;
    Ok(Redirect::to("/checkout").into_response())
}

/// Submit step 3: simulate payment, clear the cart and confirm.
#[instrument(skip(state, session, form))]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    let mut wizard = load_wizard(&session).await?;
    let mut cart = load_cart(&session).await?;

    match place_order(
        &mut wizard,
        &form,
        &mut cart,
        state.config().checkout_processing,
    )
    .await
    {
        Ok(order) => {
            save_cart(&session, &cart).await?;
            save_wizard(&session, &wizard).await?;
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_number", order.order_number.as_str())]),
            );
            Ok(Redirect::to("/checkout/confirmation").into_response())
        }
        Err(e) => Ok(CheckoutTemplate::new(&wizard, &cart).with_error(&e)),
    }
}

/// Show the confirmation for the last order.
#[instrument(skip(session))]
pub async fn confirmation(session: Session) -> Result<Response> {
    let wizard = load_wizard(&session).await?;
    let Some(order) = wizard.order() else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    let cart_count = load_cart(&session).await?.item_count();
    Ok(ConfirmationTemplate {
        order: order.clone(),
        cart_count,
    }
    .into_response())
}
