use crate::error::StoreError;
use crate::store::traits::RemoteStore;
use crate::store::types::Select;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Stand-in store used when connection parameters are missing.
///
/// Every call fails with the configuration problem so callers end up in a
/// visible error state instead of crashing.
#[derive(Debug, Clone)]
pub struct UnconfiguredStore {
    reason: String,
}

impl UnconfiguredStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::unconfigured(self.reason.clone())
    }
}

#[async_trait]
impl RemoteStore for UnconfiguredStore {
    async fn select(&self, _table: &str, _select: &Select) -> Result<Vec<Value>, StoreError> {
        Err(self.error())
    }

    async fn insert(
        &self,
        _table: &str,
        _row: Map<String, Value>,
        _select: &Select,
    ) -> Result<Vec<Value>, StoreError> {
        Err(self.error())
    }

    async fn update(
        &self,
        _table: &str,
        _patch: Map<String, Value>,
        _id: &str,
        _select: &Select,
    ) -> Result<Vec<Value>, StoreError> {
        Err(self.error())
    }

    async fn delete(&self, _table: &str, _id: &str) -> Result<(), StoreError> {
        Err(self.error())
    }
}
