use crate::error::{ListingError, Result};
use crate::models::draft::MIN_AREA;
use crate::models::Property;

/// Partial change to a listing.
///
/// `None` leaves the stored value untouched; `Some` replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area: Option<f64>,
    pub image: Option<String>,
    pub verified: Option<bool>,
    pub rating: Option<f64>,
    pub reviews: Option<u32>,
    pub virtual_tour: Option<bool>,
    pub featured: Option<bool>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub agent_id: Option<i64>,
}

impl PropertyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the listing form's rules to the fields that are present
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("title", &self.title), ("location", &self.location)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ListingError::Validation(format!("{field} is required")));
            }
        }

        if self.price.is_some_and(|price| !at_least(price, 1.0)) {
            return Err(ListingError::Validation("price must be at least 1".to_string()));
        }
        if self.bedrooms == Some(0) {
            return Err(ListingError::Validation("bedrooms must be at least 1".to_string()));
        }
        if self.bathrooms == Some(0) {
            return Err(ListingError::Validation("bathrooms must be at least 1".to_string()));
        }
        if self.area.is_some_and(|area| !at_least(area, MIN_AREA)) {
            return Err(ListingError::Validation(format!("area must be at least {MIN_AREA}")));
        }
        if self.rating.is_some_and(|rating| !at_least(rating, 0.0)) {
            return Err(ListingError::Validation("rating must be a finite number".to_string()));
        }

        Ok(())
    }
}

/// `value >= min` for finite values; NaN and infinity never pass
pub(crate) fn at_least(value: f64, min: f64) -> bool {
    value.is_finite() && value >= min
}

impl From<&Property> for PropertyPatch {
    /// Every field of the listing, as a full replacement
    fn from(property: &Property) -> Self {
        Self {
            title: Some(property.title.clone()),
            location: Some(property.location.clone()),
            price: Some(property.price),
            bedrooms: Some(property.bedrooms),
            bathrooms: Some(property.bathrooms),
            area: Some(property.area),
            image: Some(property.image.clone()),
            verified: Some(property.verified),
            rating: Some(property.rating),
            reviews: Some(property.reviews),
            virtual_tour: Some(property.virtual_tour),
            featured: Some(property.featured),
            description: Some(property.description.clone()),
            amenities: Some(property.amenities.clone()),
            // The empty agent stands for a missing foreign key
            agent_id: (!property.agent.is_empty()).then_some(property.agent.id),
        }
    }
}

/// Fields needed to list a new property
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub location: String,
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: f64,
    pub image: String,
    pub description: String,
    pub amenities: Vec<String>,
    pub verified: bool,
    pub rating: f64,
    pub reviews: u32,
    pub virtual_tour: bool,
    pub featured: bool,
    /// Listing agent; the bootstrap agent is used when absent
    pub agent_id: Option<i64>,
}

impl NewProperty {
    /// Whether a fetched listing carries the fields this insert wrote
    pub fn matches(&self, property: &Property) -> bool {
        property.title == self.title
            && property.location == self.location
            && property.price == self.price
    }
}
