//! Rewards and investor page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, response::IntoResponse, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use freshking_core::investors::{
    self, GROWTH_METRICS, HIGHLIGHTS, Highlight, InvestmentTier, Metric, TIERS,
};

use crate::filters;
use crate::routes::cart::cart_count;
use crate::state::AppState;

// =============================================================================
// Rewards
// =============================================================================

/// A rewards membership level.
pub struct RewardLevel {
    pub name: &'static str,
    /// Points needed to reach the level.
    pub points: u32,
    pub perks: &'static [&'static str],
}

const REWARD_LEVELS: [RewardLevel; 3] = [
    RewardLevel {
        name: "Sprout",
        points: 0,
        perks: &[
            "1 point for every $1 spent",
            "Free smoothie on your birthday",
        ],
    },
    RewardLevel {
        name: "Harvest",
        points: 500,
        perks: &[
            "1.5 points for every $1 spent",
            "Early access to seasonal menus",
            "Free upgrade to a large bowl once a month",
        ],
    },
    RewardLevel {
        name: "Evergreen",
        points: 1500,
        perks: &[
            "2 points for every $1 spent",
            "Invitations to chef's table tastings",
            "Free delivery on every order",
        ],
    },
];

/// Ways to earn points.
const EARN: [(&str, &str); 3] = [
    ("🥗", "Order online or in any FreshKing restaurant"),
    ("🤝", "Refer a friend and both get 100 points"),
    ("♻️", "Bring your own container for 10 bonus points"),
];

/// Rewards page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/rewards.html")]
pub struct RewardsTemplate {
    pub levels: [RewardLevel; 3],
    pub earn: [(&'static str, &'static str); 3],
    pub cart_count: u32,
}

/// Display the rewards program.
#[instrument(skip(session))]
pub async fn rewards(session: Session) -> impl IntoResponse {
    RewardsTemplate {
        levels: REWARD_LEVELS,
        earn: EARN,
        cart_count: cart_count(&session).await,
    }
}

// =============================================================================
// Investors
// =============================================================================

/// Investor relations page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/investors.html")]
pub struct InvestorsTemplate {
    pub founded: u16,
    pub locations_summary: &'static str,
    pub revenue_growth: &'static str,
    pub valuation: &'static str,
    pub funding_status: &'static str,
    pub metrics: [Metric; 4],
    pub highlights: [Highlight; 4],
    pub tiers: [InvestmentTier; 3],
    pub contact_email: &'static str,
    pub cart_count: u32,
}

impl InvestorsTemplate {
    fn new(cart_count: u32) -> Self {
        Self {
            founded: investors::FOUNDED,
            locations_summary: investors::LOCATIONS_SUMMARY,
            revenue_growth: investors::REVENUE_GROWTH,
            valuation: investors::VALUATION,
            funding_status: investors::FUNDING_STATUS,
            metrics: GROWTH_METRICS,
            highlights: HIGHLIGHTS,
            tiers: TIERS,
            contact_email: investors::CONTACT_EMAIL,
            cart_count,
        }
    }
}

/// Display the investor relations page.
#[instrument(skip(session))]
pub async fn investors_page(session: Session) -> impl IntoResponse {
    InvestorsTemplate::new(cart_count(&session).await)
}

/// Create the pages routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rewards", get(rewards))
        .route("/investors", get(investors_page))
}
