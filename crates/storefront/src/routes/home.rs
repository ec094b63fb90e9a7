//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::instrument;

use freshking_core::locations::{self, Location, OPENING_HOURS, OpeningHours};
use freshking_core::{MenuCategory, MenuItem, catalog};

use crate::filters;
use crate::routes::cart::cart_count;

// =============================================================================
// Static content
// =============================================================================

/// A value shown in the "Our Mission" section.
#[derive(Clone)]
pub struct Pillar {
    pub icon: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}

const PILLARS: [Pillar; 3] = [
    Pillar {
        icon: "🌱",
        title: "Sustainably Sourced",
        text: "Local farms, seasonal produce and biodegradable packaging in every restaurant.",
    },
    Pillar {
        icon: "💪",
        title: "Made for Wellbeing",
        text: "Balanced, nutrient-dense dishes with clear dietary labels on everything we serve.",
    },
    Pillar {
        icon: "♻️",
        title: "Zero Waste",
        text: "Our zero-waste program runs in every location, from prep to pickup.",
    },
];

/// One menu section.
pub struct MenuSection {
    pub category: MenuCategory,
    pub items: Vec<&'static MenuItem>,
}

fn menu_sections() -> Vec<MenuSection> {
    MenuCategory::ALL
        .into_iter()
        .map(|category| MenuSection {
            category,
            items: catalog::in_category(category).collect(),
        })
        .filter(|section| !section.items.is_empty())
        .collect()
}

// =============================================================================
// Handler
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub menu: Vec<MenuSection>,
    pub pillars: [Pillar; 3],
    pub locations: &'static [Location],
    pub hours: OpeningHours,
    pub cart_count: u32,
}

/// Display the home page.
#[instrument(skip(session))]
pub async fn home(session: Session) -> impl IntoResponse {
    HomeTemplate {
        menu: menu_sections(),
        pillars: PILLARS,
        locations: locations::all(),
        hours: OPENING_HOURS,
        cart_count: cart_count(&session).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_sections_cover_catalog() {
        let sections = menu_sections();
        let total: usize = sections.iter().map(|s| s.items.len()).sum();
        assert_eq!(total, catalog::items().len());
        assert_eq!(sections[0].category, MenuCategory::Bowls);
    }

    #[test]
    fn test_home_renders_menu_and_locations() {
        let html = HomeTemplate {
            menu: menu_sections(),
            pillars: PILLARS,
            locations: locations::all(),
            hours: OPENING_HOURS,
            cart_count: 0,
        }
        .render()
        .expect("render");

        assert!(html.contains("Buddha Bowl"));
        assert!(html.contains("$12.99"));
        assert!(html.contains("FreshKing HafenCity"));
        assert!(html.contains(r#"name="item_id" value="poke-bowl""#));
        assert!(html.contains(r#"href="mailto:invest@freshking.com""#));
    }
}
