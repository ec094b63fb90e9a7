//! Status enums for chat and checkout.

use serde::{Deserialize, Serialize};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// Persona and domain knowledge; never displayed.
    System,
    User,
    Assistant,
}

impl ChatRole {
    /// Wire name used by chat-completion style APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step of the checkout wizard.
///
/// The wizard is linear: `Contact → Shipping → Payment → Confirmed`.
/// Completed steps may be revisited; `Confirmed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Contact,
    Shipping,
    Payment,
    Confirmed,
}

impl CheckoutStep {
    /// 1-based position shown in the UI.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Contact => 1,
            Self::Shipping => 2,
            Self::Payment => 3,
            Self::Confirmed => 4,
        }
    }

    /// The step that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Contact => Self::Shipping,
            Self::Shipping => Self::Payment,
            Self::Payment | Self::Confirmed => Self::Confirmed,
        }
    }

    /// Heading shown above the step's form.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Contact => "Contact Information",
            Self::Shipping => "Shipping Address",
            Self::Payment => "Payment Details",
            Self::Confirmed => "Order Confirmed!",
        }
    }

    /// Route slug for the step (`/checkout/step/{slug}`).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Confirmed => "confirmed",
        }
    }
}

impl std::str::FromStr for CheckoutStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact" | "1" => Ok(Self::Contact),
            "shipping" | "2" => Ok(Self::Shipping),
            "payment" | "3" => Ok(Self::Payment),
            _ => Err(format!("invalid checkout step: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_step_is_linear() {
        assert_eq!(CheckoutStep::Contact.next(), CheckoutStep::Shipping);
        assert_eq!(CheckoutStep::Shipping.next(), CheckoutStep::Payment);
        assert_eq!(CheckoutStep::Payment.next(), CheckoutStep::Confirmed);
        assert_eq!(CheckoutStep::Confirmed.next(), CheckoutStep::Confirmed);
        assert!(CheckoutStep::Contact < CheckoutStep::Payment);
    }

    #[test]
    fn test_checkout_step_from_str() {
        assert_eq!("shipping".parse(), Ok(CheckoutStep::Shipping));
        assert_eq!("3".parse(), Ok(CheckoutStep::Payment));
        assert!("confirmed".parse::<CheckoutStep>().is_err());
    }

    #[test]
    fn test_chat_role_wire_names() {
        assert_eq!(ChatRole::System.as_str(), "system");
        let json = serde_json::to_string(&ChatRole::Assistant).expect("serialize");
        assert_eq!(json, "\"assistant\"");
    }
}
