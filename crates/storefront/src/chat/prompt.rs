//! The assistant's system prompt.
//!
//! Rendered once from the catalog, locations and investor facts, so the
//! assistant quotes the same prices and numbers as the pages.

use std::sync::LazyLock;

use askama::Template;

use freshking_core::investors::{self, Highlight, InvestmentTier, Metric};
use freshking_core::locations::{self, Location, OPENING_HOURS, OpeningHours};
use freshking_core::{MenuCategory, MenuItem, catalog};

/// A page the assistant may send the visitor to.
pub struct PageLink {
    pub path: &'static str,
    pub purpose: &'static str,
}

/// Pages offered to the assistant for `[NAVIGATE:...]`.
pub const PAGES: [PageLink; 5] = [
    PageLink {
        path: "/",
        purpose: "home page with the menu, our story and locations",
    },
    PageLink {
        path: "/cart",
        purpose: "the customer's cart",
    },
    PageLink {
        path: "/checkout",
        purpose: "checkout",
    },
    PageLink {
        path: "/rewards",
        purpose: "FreshKing Rewards program",
    },
    PageLink {
        path: "/investors",
        purpose: "investor relations",
    },
];

const FALLBACK_PROMPT: &str = "You are FreshBot, the friendly assistant for FreshKing, a healthy food restaurant chain.";

#[derive(Template)]
#[template(path = "chat/system_prompt.txt")]
struct SystemPromptTemplate {
    categories: [MenuCategory; 7],
    popular: Vec<&'static MenuItem>,
    items: &'static [MenuItem],
    locations: &'static [Location],
    hours: OpeningHours,
    founded: u16,
    locations_summary: &'static str,
    revenue_growth: &'static str,
    valuation: &'static str,
    funding_status: &'static str,
    growth_metrics: [Metric; 4],
    highlights: [Highlight; 4],
    tiers: [InvestmentTier; 3],
    pages: [PageLink; 5],
    contact_email: &'static str,
}

impl SystemPromptTemplate {
    fn new() -> Self {
        Self {
            categories: MenuCategory::ALL,
            popular: catalog::popular().collect(),
            items: catalog::items(),
            locations: locations::all(),
            hours: OPENING_HOURS,
            founded: investors::FOUNDED,
            locations_summary: investors::LOCATIONS_SUMMARY,
            revenue_growth: investors::REVENUE_GROWTH,
            valuation: investors::VALUATION,
            funding_status: investors::FUNDING_STATUS,
            growth_metrics: investors::GROWTH_METRICS,
            highlights: investors::HIGHLIGHTS,
            tiers: investors::TIERS,
            pages: PAGES,
            contact_email: investors::CONTACT_EMAIL,
        }
    }
}

static SYSTEM_PROMPT: LazyLock<String> = LazyLock::new(|| {
    SystemPromptTemplate::new().render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to render system prompt");
        FALLBACK_PROMPT.to_string()
    })
});

/// The rendered system prompt.
#[must_use]
pub fn system_prompt() -> &'static str {
    &SYSTEM_PROMPT
}
