//! FreshKing restaurants in Hamburg.

use serde::Serialize;

use crate::types::LocationId;

/// Opening hours shared by every location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpeningHours {
    pub weekdays: &'static str,
    pub saturday: &'static str,
    pub sunday: &'static str,
}

pub const OPENING_HOURS: OpeningHours = OpeningHours {
    weekdays: "08:00 - 22:00",
    saturday: "09:00 - 22:00",
    sunday: "10:00 - 21:00",
};

/// A restaurant location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: LocationId,
    /// District name, e.g. "HafenCity".
    pub name: &'static str,
    pub street: &'static str,
    pub postal: &'static str,
    pub description: &'static str,
    pub highlight: &'static str,
    pub image_url: &'static str,
    pub hours: OpeningHours,
}

impl Location {
    /// "FreshKing <district>".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("FreshKing {}", self.name)
    }

    /// Single-line postal address.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}, {}", self.street, self.postal)
    }
}

static LOCATIONS: [Location; 5] = [
    Location {
        id: LocationId::new(1),
        name: "HafenCity",
        street: "Überseeallee 10",
        postal: "20457 Hamburg",
        description: "Our flagship store in Hamburg's modern harbor district, featuring waterfront views and outdoor seating.",
        highlight: "Waterfront Views",
        image_url: "https://images.unsplash.com/photo-1554118811-1e0d58224f24?q=80&w=2047&auto=format&fit=crop",
        hours: OPENING_HOURS,
    },
    Location {
        id: LocationId::new(2),
        name: "Sternschanze",
        street: "Schulterblatt 73",
        postal: "20357 Hamburg",
        description: "Located in Hamburg's vibrant cultural quarter, our Sternschanze location embraces the neighborhood's creative spirit.",
        highlight: "Creative District",
        image_url: "https://images.unsplash.com/photo-1555396273-367ea4eb4db5?q=80&w=2074&auto=format&fit=crop",
        hours: OPENING_HOURS,
    },
    Location {
        id: LocationId::new(3),
        name: "Eppendorf",
        street: "Eppendorfer Baum 27",
        postal: "20249 Hamburg",
        description: "Nestled in the elegant Eppendorf quarter, offering a refined dining experience in a sophisticated setting.",
        highlight: "Elegant Quarter",
        image_url: "https://images.unsplash.com/photo-1564759298141-cef86f51d4d4?q=80&w=2070&auto=format&fit=crop",
        hours: OPENING_HOURS,
    },
    Location {
        id: LocationId::new(4),
        name: "Winterhude",
        street: "Mühlenkamp 39",
        postal: "22303 Hamburg",
        description: "A cozy spot in the heart of Winterhude, perfect for both quick bites and leisurely meals.",
        highlight: "Neighborhood Gem",
        image_url: "https://images.unsplash.com/photo-1466978913421-dad2ebd01d17?q=80&w=1974&auto=format&fit=crop",
        hours: OPENING_HOURS,
    },
    Location {
        id: LocationId::new(5),
        name: "Ottensen",
        street: "Ottenser Hauptstraße 3",
        postal: "22765 Hamburg",
        description: "Our latest addition in trendy Ottensen, combining modern design with the area's historic charm.",
        highlight: "Trendy Location",
        image_url: "https://images.unsplash.com/photo-1533777857889-4be7c70b33f7?q=80&w=2070&auto=format&fit=crop",
        hours: OPENING_HOURS,
    },
];

#[must_use]
pub fn all() -> &'static [Location] {
    &LOCATIONS
}

#[must_use]
pub fn find(id: LocationId) -> Option<&'static Location> {
    LOCATIONS.iter().find(|location| location.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_hamburg_locations() {
        assert_eq!(all().len(), 5);
        assert!(all().iter().all(|l| l.postal.ends_with("Hamburg")));
    }

    #[test]
    fn test_find_and_format() {
        let hafen = find(LocationId::new(1)).expect("flagship exists");
        assert_eq!(hafen.full_name(), "FreshKing HafenCity");
        assert_eq!(hafen.address(), "Überseeallee 10, 20457 Hamburg");
        assert_eq!(hafen.hours.sunday, "10:00 - 21:00");
        assert!(find(LocationId::new(42)).is_none());
    }
}
