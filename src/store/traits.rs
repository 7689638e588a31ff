use crate::error::StoreError;
use crate::store::types::Select;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Hosted relational store holding the `properties` and `agents` tables.
///
/// Rows travel as JSON objects in storage shape; mapping to entities happens
/// in the repository.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read every row of `table`, with the columns and relations in `select`
    async fn select(&self, table: &str, select: &Select) -> Result<Vec<Value>, StoreError>;

    /// Insert one row and return what the store stored, shaped by `select`.
    ///
    /// A store may answer with no rows even on success.
    async fn insert(
        &self,
        table: &str,
        row: Map<String, Value>,
        select: &Select,
    ) -> Result<Vec<Value>, StoreError>;

    /// Apply `patch` to the row whose `id` matches and return the affected rows
    async fn update(
        &self,
        table: &str,
        patch: Map<String, Value>,
        id: &str,
        select: &Select,
    ) -> Result<Vec<Value>, StoreError>;

    /// Delete the row whose `id` matches
    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;
}
