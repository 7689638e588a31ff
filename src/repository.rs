//! The only component that talks to the remote store.

use crate::error::{ListingError, Result};
use crate::mapper::{self, decode_row, decode_rows};
use crate::models::{NewProperty, Property, PropertyPatch};
use crate::store::{Embed, RemoteStore, Select};
use tracing::{debug, info, warn};

pub const PROPERTIES_TABLE: &str = "properties";
pub const AGENTS_TABLE: &str = "agents";

/// Agent columns pulled into every listing read
const AGENT_COLUMNS: [&str; 5] = ["id", "name", "is_verified", "rating", "properties_listed"];

/// `*,agent:agents(id,name,is_verified,rating,properties_listed)`
pub fn property_select() -> Select {
    Select::all().embed(Embed {
        alias: "agent".to_string(),
        table: AGENTS_TABLE.to_string(),
        foreign_key: "agent_id".to_string(),
        columns: AGENT_COLUMNS.iter().map(|c| c.to_string()).collect(),
    })
}

/// How a freshly created listing was identified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The insert answered with the joined row
    Returned,
    /// Refetched and located by the id the insert returned
    ById,
    /// Refetched and located by title, location and price
    ByContent,
    /// Refetched; nothing matched, so the last row was taken
    LastRow,
}

impl Resolution {
    /// Whether the listing is known to be the one just inserted
    pub fn is_exact(self) -> bool {
        matches!(self, Self::Returned | Self::ById)
    }
}

/// A created listing and how it was found
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub property: Property,
    pub resolution: Resolution,
}

/// CRUD over the `properties` table with the `agents` join applied
#[derive(Debug)]
pub struct PropertyRepository<S> {
    store: S,
    select: Select,
}

impl<S: RemoteStore> PropertyRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            select: property_select(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read every listing with its agent
    pub async fn fetch_all_with_agents(&self) -> Result<Vec<Property>> {
        const OPERATION: &str = "fetch properties";

        let rows = self
            .store
            .select(PROPERTIES_TABLE, &self.select)
            .await
            .map_err(|e| {
                warn!("Store read failed: {}", e);
                ListingError::read(OPERATION, e)
            })?;

        let properties = decode_rows(rows).map_err(|e| {
            warn!("Could not decode properties: {}", e);
            ListingError::read(OPERATION, e)
        })?;

        debug!("Fetched {} properties", properties.len());
        Ok(properties)
    }

    /// Insert a listing and return it with its store-assigned id and agent
    pub async fn create(&self, property: &NewProperty) -> Result<Created> {
        let row = mapper::insert_row(property)?;

        let returned = self
            .store
            .insert(PROPERTIES_TABLE, row, &self.select)
            .await
            .map_err(|e| {
                warn!("Store insert failed: {}", e);
                ListingError::write("insert property", e)
            })?;

        // A row that came back with its agent needs no second round trip
        let inserted = match returned.into_iter().next().map(decode_row).transpose() {
            Ok(inserted) => inserted,
            Err(e) => {
                warn!("Could not decode inserted row, refetching: {}", e);
                None
            }
        };
        if let Some(inserted) = &inserted {
            if !inserted.agent.is_empty() {
                info!("Created property {}", inserted.id);
                return Ok(Created {
                    property: inserted.clone(),
                    resolution: Resolution::Returned,
                });
            }
        }

        let mut all = self.fetch_all_with_agents().await?;

        let Some((index, resolution)) = locate(&all, inserted.as_ref(), property) else {
            let id = inserted.map(|p| p.id).unwrap_or_default();
            return Err(ListingError::NotFound(id));
        };
        if resolution == Resolution::LastRow {
            warn!("Created property not found in refetch, using last row");
        }

        let property = all.swap_remove(index);
        info!("Created property {} ({:?})", property.id, resolution);
        Ok(Created {
            property,
            resolution,
        })
    }

    /// Apply the fields present in `patch` to listing `id` and return the result.
    ///
    /// A patch that breaks the listing form's rules is rejected before anything is sent.
    pub async fn update_by_id(&self, id: &str, patch: &PropertyPatch) -> Result<Property> {
        patch.validate()?;
        let changes = mapper::to_storage(patch)?;

        if changes.is_empty() {
            debug!("Empty patch for property {}, only refetching", id);
        } else {
            self.store
                .update(PROPERTIES_TABLE, changes, id, &self.select)
                .await
                .map_err(|e| {
                    warn!("Store update failed: {}", e);
                    ListingError::write("update property", e)
                })?;
        }

        let property = self
            .fetch_all_with_agents()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ListingError::NotFound(id.to_string()))?;

        info!("Updated property {}", id);
        Ok(property)
    }

    /// Remove listing `id`
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.store
            .delete(PROPERTIES_TABLE, id)
            .await
            .map_err(|e| {
                warn!("Store delete failed: {}", e);
                ListingError::write("delete property", e)
            })?;

        info!("Deleted property {}", id);
        Ok(())
    }
}

/// Find the created listing in a refetched collection.
///
/// Prefers the id the insert returned; without one, matches on title,
/// location and price, and as a last resort takes the final row.
fn locate(
    all: &[Property],
    inserted: Option<&Property>,
    property: &NewProperty,
) -> Option<(usize, Resolution)> {
    let found = match inserted {
        Some(inserted) => all
            .iter()
            .position(|p| p.id == inserted.id)
            .map(|i| (i, Resolution::ById)),
        None => all
            .iter()
            .position(|p| property.matches(p))
            .map(|i| (i, Resolution::ByContent)),
    };

    found.or_else(|| all.len().checked_sub(1).map(|last| (last, Resolution::LastRow)))
}
