use serde::{Deserialize, Serialize};

pub mod draft;
pub mod patch;

pub use draft::{parse_amenities, PropertyDraft};
pub use patch::{NewProperty, PropertyPatch};

/// Agent responsible for a listing, as joined from the `agents` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub is_verified: bool,
    pub rating: f64,
    pub properties_listed: i64,
}

impl Agent {
    /// Stand-in used when a listing has no joined agent
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

/// Rental listing as the application sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    pub location: String,
    /// Monthly rent
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Floor area in square metres
    pub area: f64,
    pub image: String,
    pub verified: bool,
    pub rating: f64,
    pub reviews: u32,
    pub virtual_tour: bool,
    pub featured: bool,
    pub description: String,
    pub amenities: Vec<String>,
    pub agent: Agent,
}
