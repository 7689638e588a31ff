//! Translation between `properties` rows (snake_case, `agent_id` foreign key)
//! and the application's [`Property`] (camelCase, nested [`Agent`]).

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ListingError, StoreError};
use crate::models::{Agent, NewProperty, Property, PropertyPatch};

/// Agent assigned to listings created without one
pub const BOOTSTRAP_AGENT_ID: i64 = 1;

/// Raw `properties` row, optionally carrying the embedded `agent` relation
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StorageRow {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub bathrooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub area: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub agent_id: Option<i64>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub reviews_count: Option<u32>,
    #[serde(default)]
    pub has_virtual_tour: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub agent: Option<AgentRow>,
}

/// Raw `agents` row as embedded in a property select
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AgentRow {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub properties_listed: Option<i64>,
}

impl From<AgentRow> for Agent {
    fn from(row: AgentRow) -> Self {
        Self {
            id: row.id.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            is_verified: row.is_verified.unwrap_or(false),
            rating: row.rating.unwrap_or_default(),
            properties_listed: row.properties_listed.unwrap_or_default(),
        }
    }
}

/// Build the application entity from a storage row and its joined agent.
///
/// Missing text becomes empty, missing flags false, missing counts zero, and
/// a missing agent becomes [`Agent::empty`].
pub fn to_application(row: StorageRow, agent: Option<AgentRow>) -> Property {
    Property {
        id: row.id,
        title: row.title.unwrap_or_default(),
        location: row.location.unwrap_or_default(),
        price: row.price.unwrap_or_default(),
        bedrooms: row.bedrooms.unwrap_or_default(),
        bathrooms: row.bathrooms.unwrap_or_default(),
        area: row.area.unwrap_or_default(),
        image: row.image_url.unwrap_or_default(),
        verified: row.is_verified.unwrap_or(false),
        rating: row.rating.unwrap_or_default(),
        reviews: row.reviews_count.unwrap_or_default(),
        virtual_tour: row.has_virtual_tour.unwrap_or(false),
        featured: row.is_featured.unwrap_or(false),
        description: row.description.unwrap_or_default(),
        amenities: row.amenities.unwrap_or_default(),
        agent: agent.map_or_else(Agent::empty, Agent::from),
    }
}

/// Decode one JSON row returned by the store into a [`Property`]
pub fn decode_row(value: Value) -> Result<Property, StoreError> {
    let mut row: StorageRow = serde_json::from_value(value)
        .map_err(|e| StoreError::decode(format!("malformed properties row: {e}")))?;
    let agent = row.agent.take();

    Ok(to_application(row, agent))
}

/// Decode every row of a select, failing on the first malformed one
pub fn decode_rows(values: Vec<Value>) -> Result<Vec<Property>, StoreError> {
    values.into_iter().map(decode_row).collect()
}

/// Storage patch holding only the fields present in `patch`.
///
/// A present number that is not finite is rejected: JSON has no NaN or
/// infinity, and writing `null` in its place would clear the column.
pub fn to_storage(patch: &PropertyPatch) -> Result<Map<String, Value>, ListingError> {
    let mut row = Map::new();

    put(&mut row, "title", patch.title.clone());
    put(&mut row, "location", patch.location.clone());
    put(&mut row, "price", number("price", patch.price)?);
    put(&mut row, "bedrooms", patch.bedrooms);
    put(&mut row, "bathrooms", patch.bathrooms);
    put(&mut row, "area", number("area", patch.area)?);
    put(&mut row, "image_url", patch.image.clone());
    put(&mut row, "is_verified", patch.verified);
    put(&mut row, "rating", number("rating", patch.rating)?);
    put(&mut row, "reviews_count", patch.reviews);
    put(&mut row, "has_virtual_tour", patch.virtual_tour);
    put(&mut row, "is_featured", patch.featured);
    put(&mut row, "description", patch.description.clone());
    put(&mut row, "amenities", patch.amenities.clone());
    put(&mut row, "agent_id", patch.agent_id);

    Ok(row)
}

/// Full row for inserting a new listing
pub fn insert_row(property: &NewProperty) -> Result<Map<String, Value>, ListingError> {
    let mut row = to_storage(&PropertyPatch {
        title: Some(property.title.clone()),
        location: Some(property.location.clone()),
        price: Some(property.price),
        bedrooms: Some(property.bedrooms),
        bathrooms: Some(property.bathrooms),
        area: Some(property.area),
        image: None,
        verified: Some(property.verified),
        rating: Some(property.rating),
        reviews: Some(property.reviews),
        virtual_tour: Some(property.virtual_tour),
        featured: Some(property.featured),
        description: None,
        amenities: Some(property.amenities.clone()),
        agent_id: Some(property.agent_id.unwrap_or(BOOTSTRAP_AGENT_ID)),
    })?;

    // Blank text columns are stored as NULL
    row.insert("image_url".to_string(), text_or_null(&property.image));
    row.insert("description".to_string(), text_or_null(&property.description));

    Ok(row)
}

fn put<T: Into<Value>>(row: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        row.insert(key.to_string(), value.into());
    }
}

fn text_or_null(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text.to_string())
    }
}

/// Whole numbers are written as JSON integers so `500.0` goes out as `500`
fn number(field: &str, value: Option<f64>) -> Result<Option<Value>, ListingError> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    match value {
        None => Ok(None),
        Some(v) if !v.is_finite() => Err(ListingError::Validation(format!(
            "{field} must be a finite number"
        ))),
        Some(v) if v.fract() == 0.0 && v.abs() < MAX_EXACT => Ok(Some(Value::from(v as i64))),
        Some(v) => Ok(Some(Value::from(v))),
    }
}

/// Deserializers that accept numbers sent either as JSON numbers or as text
mod lenient {
    use serde::de::{Deserializer, Error as _};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(serde_json::Number),
        Text(String),
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Loose>::deserialize(d)? {
            None => Ok(None),
            Some(Loose::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("number {n} out of range"))),
            Some(Loose::Text(text)) => parse_text(&text),
        }
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let value = match Option::<Loose>::deserialize(d)? {
            None => return Ok(None),
            Some(Loose::Number(n)) => match n.as_i64() {
                Some(v) => return Ok(Some(v)),
                None => n.as_f64(),
            },
            Some(Loose::Text(text)) => parse_text(&text)?,
        };

        match value {
            None => Ok(None),
            Some(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(Some(v as i64)),
            Some(v) => Err(D::Error::custom(format!("expected a whole number, found {v}"))),
        }
    }

    /// Non-negative whole number that fits a `u32`
    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        match int(d)? {
            None => Ok(None),
            Some(v) => u32::try_from(v)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("count {v} out of range"))),
        }
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Loose::deserialize(d)? {
            Loose::Number(n) => Ok(n.to_string()),
            Loose::Text(text) => Ok(text),
        }
    }

    fn parse_text<E: serde::de::Error>(text: &str) -> Result<Option<f64>, E> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        text.parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("expected a number, found {text:?}")))
    }
}
