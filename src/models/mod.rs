use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of rental unit a listing describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
}

/// Core property data model
///
/// The record body is what gets persisted under `properties/{id}`; the id
/// itself is the store key and is filled back in on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(skip_serializing, default)]
    pub id: String,
    pub title: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
    pub monthly_rent: f64,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub owner_id: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub is_available: bool,
}

/// A room-count filter band: a concrete count, or an open-ended "N or more"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomBand {
    #[default]
    Any,
    Exactly(u32),
    AtLeast(u32),
}

impl RoomBand {
    /// Whether a stored room count falls inside this band
    pub fn matches(&self, count: u32) -> bool {
        match *self {
            RoomBand::Any => true,
            RoomBand::Exactly(n) => count == n,
            RoomBand::AtLeast(floor) => count >= floor,
        }
    }

    /// Parse a UI band value: "any", a plain number, or a "6+" style floor
    pub fn parse(value: &str) -> Option<RoomBand> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("any") {
            return Some(RoomBand::Any);
        }
        if let Some(floor) = value.strip_suffix('+') {
            return floor.parse().ok().map(RoomBand::AtLeast);
        }
        value.parse().ok().map(RoomBand::Exactly)
    }
}

/// Property-type filter: a concrete type or no constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(PropertyType),
}

/// Client-local filter state applied to the fetched catalog
///
/// Every field defaults to "no constraint", so `FilterState::default()` is
/// the reset state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search_query: String,
    pub property_type: TypeFilter,
    pub bedrooms: RoomBand,
    pub bathrooms: RoomBand,
}

/// Ordering applied to the filtered catalog view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Store fetch order, untouched
    #[default]
    Default,
    PriceAscending,
    PriceDescending,
}
