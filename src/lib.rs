//! Rental listing client: browse, save, add, edit and delete property
//! listings kept in a hosted relational store with a joined agent relation.

pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod repository;
pub mod state;
pub mod store;

pub use config::StoreConfig;
pub use error::{ListingError, StoreError, StoreErrorKind};
pub use models::{Agent, NewProperty, Property, PropertyDraft, PropertyPatch};
pub use repository::{Created, PropertyRepository, Resolution};
pub use state::PropertyState;
