//! Checkout wizard.
//!
//! A linear three-step form (contact → shipping → payment) over the cart.
//! Progress lives in the visitor's session; payment details are checked for
//! presence and then discarded. Placing the order waits out a simulated
//! processing delay, clears the cart and records a confirmation.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use freshking_core::{Cart, CheckoutStep, Email, EmailError, Price};

/// Errors from checkout operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// A required field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The email address is malformed.
    #[error("Please enter a valid email address")]
    InvalidEmail(#[from] EmailError),

    /// Nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The step can't be shown or submitted yet.
    #[error("Please complete the earlier steps before {}", .0.title())]
    StepNotReached(CheckoutStep),
}

// =============================================================================
// Forms
// =============================================================================

/// Step 1 form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Step 2 form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
}

/// Step 3 form. Deserialize-only so it can't end up in the session.
#[derive(Default, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
}

impl std::fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentForm")
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &"[REDACTED]")
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

fn require<'a>(value: &'a str, label: &'static str) -> Result<&'a str, CheckoutError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CheckoutError::MissingField(label));
    }
    Ok(value)
}

impl ContactForm {
    fn validate(&self) -> Result<Self, CheckoutError> {
        let first_name = require(&self.first_name, "First name")?;
        let last_name = require(&self.last_name, "Last name")?;
        let email = Email::parse(require(&self.email, "Email")?)?;
        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.as_str().to_string(),
        })
    }
}

impl ShippingForm {
    fn validate(&self) -> Result<Self, CheckoutError> {
        Ok(Self {
            address: require(&self.address, "Street address")?.to_string(),
            city: require(&self.city, "City")?.to_string(),
            zip_code: require(&self.zip_code, "ZIP code")?.to_string(),
        })
    }
}

impl PaymentForm {
    fn validate(&self) -> Result<(), CheckoutError> {
        require(&self.card_number, "Card number")?;
        require(&self.expiry_date, "Expiry date")?;
        require(&self.cvv, "CVV")?;
        Ok(())
    }
}

// =============================================================================
// Wizard
// =============================================================================

/// A line on the order confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub line_total: Price,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedOrder {
    /// "FK-" followed by six digits.
    pub order_number: String,
    pub first_name: String,
    pub email: String,
    pub lines: Vec<OrderLine>,
    pub total: Price,
}

/// Checkout progress for one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutWizard {
    current: CheckoutStep,
    contact: Option<ContactForm>,
    shipping: Option<ShippingForm>,
    order: Option<ConfirmedOrder>,
}

impl CheckoutWizard {
    /// The step being shown.
    #[must_use]
    pub const fn current(&self) -> CheckoutStep {
        self.current
    }

    /// Furthest step the visitor may open.
    #[must_use]
    pub const fn furthest(&self) -> CheckoutStep {
        if self.order.is_some() {
            CheckoutStep::Confirmed
        } else if self.shipping.is_some() {
            CheckoutStep::Payment
        } else if self.contact.is_some() {
            CheckoutStep::Shipping
        } else {
            CheckoutStep::Contact
        }
    }

    #[must_use]
    pub const fn contact(&self) -> Option<&ContactForm> {
        self.contact.as_ref()
    }

    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingForm> {
        self.shipping.as_ref()
    }

    #[must_use]
    pub const fn order(&self) -> Option<&ConfirmedOrder> {
        self.order.as_ref()
    }

    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.order.is_some()
    }

    /// Go back to a step that has been reached.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::StepNotReached`] for steps beyond the furthest
    /// one, and for every step once the order is confirmed.
    pub fn revisit(&mut self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.is_confirmed() || step == CheckoutStep::Confirmed || step > self.furthest() {
            return Err(CheckoutError::StepNotReached(step));
        }
        self.current = step;
        Ok(())
    }

    /// Submit step 1.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank or the email is malformed.
    pub fn submit_contact(&mut self, form: &ContactForm) -> Result<(), CheckoutError> {
        self.ensure_open(CheckoutStep::Contact)?;
        self.contact = Some(form.validate()?);
        self.current = CheckoutStep::Shipping;
        Ok(())
    }

    /// Submit step 2.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank or step 1 is incomplete.
    pub fn submit_shipping(&mut self, form: &ShippingForm) -> Result<(), CheckoutError> {
        self.ensure_open(CheckoutStep::Shipping)?;
        self.shipping = Some(form.validate()?);
        self.current = CheckoutStep::Payment;
        Ok(())
    }

    /// Check step 3 without placing the order.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, an earlier step is incomplete or
    /// the cart is empty.
    pub fn check_payment(&self, form: &PaymentForm, cart: &Cart) -> Result<(), CheckoutError> {
        self.ensure_open(CheckoutStep::Payment)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        form.validate()
    }

    /// Record the order for `cart` and move to the confirmation.
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_payment`].
    pub fn confirm(&mut self, form: &PaymentForm, cart: &Cart) -> Result<&ConfirmedOrder, CheckoutError> {
        self.check_payment(form, cart)?;
        let contact = self
            .contact
            .as_ref()
            .ok_or(CheckoutError::StepNotReached(CheckoutStep::Contact))?;

        let order = ConfirmedOrder {
            order_number: generate_order_number(),
            first_name: contact.first_name.clone(),
            email: contact.email.clone(),
            lines: cart
                .lines()
                .into_iter()
                .map(|line| OrderLine {
                    name: line.item.name.to_string(),
                    quantity: line.quantity,
                    line_total: line.line_total,
                })
                .collect(),
            total: cart.total(),
        };

        self.current = CheckoutStep::Confirmed;
        Ok(self.order.insert(order))
    }

    fn ensure_open(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.is_confirmed() || step > self.furthest() {
            return Err(CheckoutError::StepNotReached(step));
        }
        Ok(())
    }
}

/// Generate an order number like "FK-482913".
fn generate_order_number() -> String {
    let n: u32 = rand::rng().random_range(100_000..1_000_000);
    format!("FK-{n}")
}

/// Validate the payment step, wait out the processing delay, then confirm
/// the order and clear the cart.
///
/// Validation happens before the delay so a mistake is reported at once.
///
/// # Errors
///
/// Returns an error if the payment step can't be submitted.
#[instrument(skip(wizard, form, cart), fields(items = cart.item_count()))]
pub async fn place_order(
    wizard: &mut CheckoutWizard,
    form: &PaymentForm,
    cart: &mut Cart,
    processing: Duration,
) -> Result<ConfirmedOrder, CheckoutError> {
    wizard.check_payment(form, cart)?;

    tokio::time::sleep(processing).await;

    let order = wizard.confirm(form, cart)?.clone();
    cart.clear();
    tracing::info!(
        order_number = %order.order_number,
        total = %order.total.display(),
        "Order placed"
    );
    Ok(order)
}
