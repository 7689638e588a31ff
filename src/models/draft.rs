use crate::error::{ListingError, Result};
use crate::models::patch::at_least;
use crate::models::{NewProperty, Property, PropertyPatch};

/// Minimum floor area accepted for a listing (square metres)
pub const MIN_AREA: f64 = 10.0;

/// Listing form input, with amenities typed as one comma-separated string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDraft {
    pub title: String,
    pub location: String,
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: f64,
    pub image: String,
    pub description: String,
    pub amenities: String,
}

/// Split a comma-separated amenity list, keeping order and dropping blanks
pub fn parse_amenities(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<&Property> for PropertyDraft {
    /// Pre-fill an edit form from an existing listing
    fn from(property: &Property) -> Self {
        Self {
            title: property.title.clone(),
            location: property.location.clone(),
            price: property.price,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            area: property.area,
            image: property.image.clone(),
            description: property.description.clone(),
            amenities: property.amenities.join(", "),
        }
    }
}

impl PropertyDraft {
    /// Check the same rules the listing form enforces
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("title", &self.title),
            ("location", &self.location),
            ("image", &self.image),
            ("description", &self.description),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ListingError::Validation(format!("{field} is required")));
            }
        }

        if !at_least(self.price, 1.0) {
            return Err(ListingError::Validation("price must be at least 1".to_string()));
        }
        if self.bedrooms < 1 {
            return Err(ListingError::Validation("bedrooms must be at least 1".to_string()));
        }
        if self.bathrooms < 1 {
            return Err(ListingError::Validation("bathrooms must be at least 1".to_string()));
        }
        if !at_least(self.area, MIN_AREA) {
            return Err(ListingError::Validation(format!("area must be at least {MIN_AREA}")));
        }

        Ok(())
    }

    /// Validate and turn the form into a new listing
    pub fn into_new_property(self) -> Result<NewProperty> {
        self.validate()?;

        Ok(NewProperty {
            amenities: parse_amenities(&self.amenities),
            title: self.title,
            location: self.location,
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            image: self.image,
            description: self.description,
            ..Default::default()
        })
    }

    /// Validate and turn the form into an edit of every form field
    pub fn into_patch(self) -> Result<PropertyPatch> {
        self.validate()?;

        Ok(PropertyPatch {
            amenities: Some(parse_amenities(&self.amenities)),
            title: Some(self.title),
            location: Some(self.location),
            price: Some(self.price),
            bedrooms: Some(self.bedrooms),
            bathrooms: Some(self.bathrooms),
            area: Some(self.area),
            image: Some(self.image),
            description: Some(self.description),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    fn draft() -> PropertyDraft {
        PropertyDraft {
            title: "Loft A".to_string(),
            location: "Harare".to_string(),
            price: 500.0,
            bedrooms: 1,
            bathrooms: 1,
            area: 40.0,
            image: "http://x/y.jpg".to_string(),
            description: "d".to_string(),
            amenities: " wifi, ,parking ,".to_string(),
        }
    }

    #[test]
    fn amenities_are_trimmed_and_blanks_dropped() {
        assert_eq!(parse_amenities(" wifi, ,parking ,"), vec!["wifi", "parking"]);
        assert!(parse_amenities("").is_empty());
    }

    #[test]
    fn valid_draft_becomes_new_property() -> TestResult {
        let new = draft().into_new_property()?;

        assert_eq!(new.amenities, vec!["wifi", "parking"]);
        assert_eq!(new.agent_id, None);
        assert!(!new.featured);

        Ok(())
    }

    #[test]
    fn blank_title_is_rejected() {
        let input = PropertyDraft {
            title: "  ".to_string(),
            ..draft()
        };

        let err = input.validate();

        let Err(ListingError::Validation(msg)) = &err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(msg, "title is required");
    }

    #[test]
    fn numeric_minimums_are_enforced() {
        let invalid = [
            PropertyDraft {
                price: 0.0,
                ..draft()
            },
            PropertyDraft {
                price: f64::INFINITY,
                ..draft()
            },
            PropertyDraft {
                bedrooms: 0,
                ..draft()
            },
            PropertyDraft {
                bathrooms: 0,
                ..draft()
            },
            PropertyDraft {
                area: 9.5,
                ..draft()
            },
            PropertyDraft {
                area: f64::NAN,
                ..draft()
            },
        ];

        for input in invalid {
            assert!(input.validate().is_err(), "{input:?} passed validation");
        }
    }

    #[test]
    fn edit_patch_leaves_flags_untouched() -> TestResult {
        let patch = draft().into_patch()?;

        assert_eq!(patch.price, Some(500.0));
        assert_eq!(patch.featured, None);
        assert_eq!(patch.agent_id, None);

        Ok(())
    }
}
