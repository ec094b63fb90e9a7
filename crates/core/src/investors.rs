//! Company facts for investors.
//!
//! The investor page and the chat assistant's prompt both render from these
//! constants so the numbers can't drift apart.

use serde::Serialize;

use crate::types::Price;

pub const FOUNDED: u16 = 2020;
pub const LOCATIONS_SUMMARY: &str = "15+ restaurants across major cities";
pub const REVENUE_GROWTH: &str = "200% year-over-year";
pub const VALUATION: &str = "$50M";
pub const FUNDING_STATUS: &str = "Series A round open";
pub const CONTACT_EMAIL: &str = "invest@freshking.com";

/// A labelled figure such as "Customer Retention Rate: 80%".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: &'static str,
}

/// A group of investment highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub title: &'static str,
    pub points: &'static [&'static str],
}

/// A level of participation in the funding round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvestmentTier {
    pub name: &'static str,
    pub minimum_cents: i64,
    pub equity_percent: u8,
    pub perk: &'static str,
}

impl InvestmentTier {
    #[must_use]
    pub fn minimum(&self) -> Price {
        Price::usd_cents(self.minimum_cents)
    }

    /// Minimum formatted without cents, e.g. "$250,000".
    #[must_use]
    pub fn minimum_display(&self) -> String {
        let dollars = (self.minimum_cents / 100).to_string();
        let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
        for (i, ch) in dollars.chars().enumerate() {
            if i > 0 && (dollars.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("${grouped}")
    }

    /// "5% equity + Board seat".
    #[must_use]
    pub fn benefits(&self) -> String {
        format!("{}% equity + {}", self.equity_percent, self.perk)
    }
}

pub const GROWTH_METRICS: [Metric; 4] = [
    Metric {
        label: "YoY Revenue Growth",
        value: "200%",
    },
    Metric {
        label: "Customer Retention Rate",
        value: "80%",
    },
    Metric {
        label: "Gross Margin",
        value: "45%",
    },
    Metric {
        label: "EBITDA Margin",
        value: "25%",
    },
];

pub const HIGHLIGHTS: [Highlight; 4] = [
    Highlight {
        title: "Market Leadership",
        points: &[
            "Leading healthy fast-casual chain",
            "Innovative menu with focus on sustainability",
            "Strong brand recognition",
        ],
    },
    Highlight {
        title: "Expansion Plans",
        points: &[
            "50+ new locations by 2025",
            "International expansion starting 2024",
            "Ghost kitchen partnerships",
            "Franchise model development",
        ],
    },
    Highlight {
        title: "Technology Integration",
        points: &[
            "Advanced POS System",
            "Mobile App with 100K+ downloads",
            "AI-powered inventory management",
            "Data-driven menu optimization",
        ],
    },
    Highlight {
        title: "Sustainability Initiatives",
        points: &[
            "100% Renewable Energy by 2024",
            "Zero-waste program in all locations",
            "Local sourcing partnerships",
            "Biodegradable packaging",
        ],
    },
];

pub const TIERS: [InvestmentTier; 3] = [
    InvestmentTier {
        name: "Seed",
        minimum_cents: 5_000_000,
        equity_percent: 2,
        perk: "Advisory role",
    },
    InvestmentTier {
        name: "Series A",
        minimum_cents: 25_000_000,
        equity_percent: 5,
        perk: "Board seat",
    },
    InvestmentTier {
        name: "Strategic",
        minimum_cents: 100_000_000,
        equity_percent: 15,
        perk: "Executive board",
    },
];
