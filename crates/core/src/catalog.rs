//! The FreshKing menu.
//!
//! Static, ordered catalog data. Items are looked up by slug id; a missing id
//! is `None`, never an error, because ids also arrive from model output.

use serde::Serialize;

use crate::types::{MenuItemId, Price};

/// Menu section an item is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Bowls,
    Sandwiches,
    Soups,
    MainMeals,
    Salads,
    Smoothies,
    Snacks,
}

impl MenuCategory {
    /// All categories in menu order.
    pub const ALL: [Self; 7] = [
        Self::Bowls,
        Self::Sandwiches,
        Self::Soups,
        Self::MainMeals,
        Self::Salads,
        Self::Smoothies,
        Self::Snacks,
    ];

    /// Heading shown on the menu.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bowls => "Bowls",
            Self::Sandwiches => "Sandwiches",
            Self::Soups => "Soups",
            Self::MainMeals => "Main Meals",
            Self::Salads => "Salads",
            Self::Smoothies => "Smoothies",
            Self::Snacks => "Snacks",
        }
    }
}

/// A purchasable menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Slug id, also used in `[ADD_TO_CART:<id>]` directives.
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Price in US cents.
    pub price_cents: i64,
    pub image_url: &'static str,
    pub category: MenuCategory,
    /// Dietary labels such as "Vegan" or "GF".
    pub dietary: &'static [&'static str],
    /// Listed in the "Popular Items" table of the assistant prompt.
    pub popular: bool,
}

impl MenuItem {
    #[must_use]
    pub fn price(&self) -> Price {
        Price::usd_cents(self.price_cents)
    }

    #[must_use]
    pub fn item_id(&self) -> MenuItemId {
        MenuItemId::new(self.id)
    }

    /// Dietary labels joined for display, e.g. "Vegan & GF".
    #[must_use]
    pub fn dietary_label(&self) -> String {
        self.dietary.join(" & ")
    }
}

static MENU: [MenuItem; 12] = [
    MenuItem {
        id: "buddha-bowl",
        name: "Buddha Bowl",
        description: "Quinoa, roasted sweet potato, chickpeas, kale and tahini dressing.",
        price_cents: 1299,
        image_url: "https://images.unsplash.com/photo-1512621776951-a57141f2eefd?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Bowls,
        dietary: &["Vegan", "GF"],
        popular: true,
    },
    MenuItem {
        id: "poke-bowl",
        name: "Poke Bowl",
        description: "Sushi-grade salmon, edamame, avocado, pickled ginger over brown rice.",
        price_cents: 1499,
        image_url: "https://images.unsplash.com/photo-1546069901-ba9599a7e63c?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Bowls,
        dietary: &["GF"],
        popular: true,
    },
    MenuItem {
        id: "avocado-club",
        name: "Avocado Club",
        description: "Smashed avocado, grilled chicken, tomato and greens on sourdough.",
        price_cents: 1099,
        image_url: "https://images.unsplash.com/photo-1528735602780-2552fd46c7af?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Sandwiches,
        dietary: &[],
        popular: false,
    },
    MenuItem {
        id: "falafel-wrap",
        name: "Falafel Wrap",
        description: "Crispy falafel, hummus, pickled onion and herbs in a whole-wheat wrap.",
        price_cents: 949,
        image_url: "https://images.unsplash.com/photo-1529006557810-274b9b2fc783?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Sandwiches,
        dietary: &["Vegan"],
        popular: false,
    },
    MenuItem {
        id: "tomato-basil-soup",
        name: "Tomato Basil Soup",
        description: "Slow-roasted tomatoes, fresh basil and a swirl of olive oil.",
        price_cents: 699,
        image_url: "https://images.unsplash.com/photo-1547592166-23ac45744acd?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Soups,
        dietary: &["Vegan", "GF"],
        popular: false,
    },
    MenuItem {
        id: "grilled-salmon",
        name: "Grilled Salmon",
        description: "Wild salmon fillet, lemon herb quinoa and seasonal greens.",
        price_cents: 1899,
        image_url: "https://images.unsplash.com/photo-1467003909585-2f8a72700288?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::MainMeals,
        dietary: &["GF"],
        popular: true,
    },
    MenuItem {
        id: "herb-chicken-plate",
        name: "Herb Chicken Plate",
        description: "Free-range chicken breast, roasted vegetables and wild rice.",
        price_cents: 1649,
        image_url: "https://images.unsplash.com/photo-1532550907401-a500c9a57435?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::MainMeals,
        dietary: &["GF"],
        popular: false,
    },
    MenuItem {
        id: "mediterranean-salad",
        name: "Mediterranean Salad",
        description: "Cucumber, tomato, olives, feta and oregano vinaigrette.",
        price_cents: 1199,
        image_url: "https://images.unsplash.com/photo-1540189549336-e6e99c3679fe?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Salads,
        dietary: &["GF"],
        popular: true,
    },
    MenuItem {
        id: "green-goddess-smoothie",
        name: "Green Goddess Smoothie",
        description: "Spinach, mango, banana, chia and coconut water.",
        price_cents: 799,
        image_url: "https://images.unsplash.com/photo-1610970881699-44a5587cabec?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Smoothies,
        dietary: &["Vegan", "GF"],
        popular: true,
    },
    MenuItem {
        id: "berry-boost-smoothie",
        name: "Berry Boost Smoothie",
        description: "Blueberries, strawberries, oat milk and a touch of honey.",
        price_cents: 749,
        image_url: "https://images.unsplash.com/photo-1553530666-ba11a7da3888?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Smoothies,
        dietary: &["GF"],
        popular: false,
    },
    MenuItem {
        id: "energy-bites",
        name: "Energy Bites",
        description: "Dates, almonds, cacao and coconut rolled into bite-size snacks.",
        price_cents: 499,
        image_url: "https://images.unsplash.com/photo-1604329760661-e71dc83f8f26?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Snacks,
        dietary: &["Vegan", "GF"],
        popular: false,
    },
    MenuItem {
        id: "hummus-crudites",
        name: "Hummus & Crudités",
        description: "Creamy hummus with carrot, cucumber and pepper sticks.",
        price_cents: 599,
        image_url: "https://images.unsplash.com/photo-1577805947697-89e18249d767?q=80&w=1200&auto=format&fit=crop",
        category: MenuCategory::Snacks,
        dietary: &["Vegan", "GF"],
        popular: false,
    },
];

/// All menu items in display order.
#[must_use]
pub fn items() -> &'static [MenuItem] {
    &MENU
}

/// Look up an item by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static MenuItem> {
    let id = id.trim();
    MENU.iter().find(|item| item.id == id)
}

/// Items in a category, in display order.
pub fn in_category(category: MenuCategory) -> impl Iterator<Item = &'static MenuItem> {
    MENU.iter().filter(move |item| item.category == category)
}

/// Items flagged as popular.
pub fn popular() -> impl Iterator<Item = &'static MenuItem> {
    MENU.iter().filter(|item| item.popular)
}
