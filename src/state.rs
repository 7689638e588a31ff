//! Session-lifetime listing state.
//!
//! [`PropertyState`] is the recovery boundary: repository failures land in
//! its error slot and the mutating operations report a plain success flag.
//! After a successful write the local collection is patched in place instead
//! of being refetched, except when a created listing could not be identified
//! exactly, in which case the whole collection is reloaded.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::ListingError;
use crate::models::{NewProperty, Property, PropertyPatch};
use crate::repository::PropertyRepository;
use crate::store::RemoteStore;

/// Listings, load status and saved marks for one session
#[derive(Debug)]
pub struct PropertyState<S> {
    repository: PropertyRepository<S>,
    properties: Vec<Property>,
    saved_ids: HashSet<String>,
    is_loading: bool,
    error: Option<ListingError>,
    refreshed_at: Option<DateTime<Utc>>,
    last_added: Option<String>,
}

impl<S: RemoteStore> PropertyState<S> {
    /// Empty state; nothing is loaded until [`refresh`](Self::refresh) runs
    pub fn new(repository: PropertyRepository<S>) -> Self {
        Self {
            repository,
            properties: Vec::new(),
            saved_ids: HashSet::new(),
            is_loading: false,
            error: None,
            refreshed_at: None,
            last_added: None,
        }
    }

    /// Build the state and perform the initial load
    pub async fn mount(repository: PropertyRepository<S>) -> Self {
        let mut state = Self::new(repository);
        state.refresh().await;
        state
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&ListingError> {
        self.error.as_ref()
    }

    /// When the collection was last loaded successfully
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn repository(&self) -> &PropertyRepository<S> {
        &self.repository
    }

    /// The listing created by the last successful [`add`](Self::add), when
    /// it was identified exactly and is still loaded
    pub fn last_added(&self) -> Option<&Property> {
        self.last_added.as_deref().and_then(|id| self.get_by_id(id))
    }

    /// Reload every listing from the store.
    ///
    /// On failure the previous listings stay in place and the error is kept.
    pub async fn refresh(&mut self) {
        self.is_loading = true;
        self.error = None;

        match self.repository.fetch_all_with_agents().await {
            Ok(properties) => {
                debug!("Loaded {} properties", properties.len());
                self.properties = properties;
                self.refreshed_at = Some(Utc::now());
            }
            Err(e) => {
                warn!(
                    "Refresh failed, keeping {} stale properties: {}",
                    self.properties.len(),
                    e
                );
                self.error = Some(e);
            }
        }

        self.is_loading = false;
    }

    /// Create a listing and add it to the collection
    pub async fn add(&mut self, property: NewProperty) -> bool {
        self.last_added = None;
        let created = match self.repository.create(&property).await {
            Ok(created) => created,
            Err(e) => return self.fail("add", e),
        };
        self.error = None;

        if created.resolution.is_exact() {
            info!("Added property {}", created.property.id);
            self.last_added = Some(created.property.id.clone());
            self.properties.push(created.property);
        } else {
            // The returned listing may not be ours; reload instead of guessing
            info!("Added property, reloading to pick it up");
            self.refresh().await;
        }
        true
    }

    /// Change the listed fields of listing `id`, keeping its position
    pub async fn update(&mut self, id: &str, patch: &PropertyPatch) -> bool {
        let updated = match self.repository.update_by_id(id, patch).await {
            Ok(updated) => updated,
            Err(e) => return self.fail("update", e),
        };
        self.error = None;

        match self.properties.iter_mut().find(|p| p.id == id) {
            Some(slot) => *slot = updated,
            None => self.properties.push(updated),
        }
        info!("Updated property {}", id);
        true
    }

    /// Delete listing `id` and drop it from the collection
    pub async fn remove(&mut self, id: &str) -> bool {
        if let Err(e) = self.repository.delete_by_id(id).await {
            return self.fail("remove", e);
        }
        self.error = None;

        if let Some(index) = self.properties.iter().position(|p| p.id == id) {
            self.properties.remove(index);
        }
        info!("Removed property {}", id);
        true
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// Mark or unmark `id` as saved for this session
    pub fn toggle_saved(&mut self, id: &str) {
        if !self.saved_ids.remove(id) {
            self.saved_ids.insert(id.to_string());
        }
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved_ids.contains(id)
    }

    pub fn saved_ids(&self) -> &HashSet<String> {
        &self.saved_ids
    }

    /// Loaded listings marked as saved, in collection order
    pub fn saved_properties(&self) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|p| self.saved_ids.contains(&p.id))
            .collect()
    }

    fn fail(&mut self, operation: &str, error: ListingError) -> bool {
        warn!("Could not {} property: {}", operation, error);
        self.error = Some(error);
        false
    }
}
