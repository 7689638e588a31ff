use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::StoreError;
use crate::store::traits::RemoteStore;
use crate::store::types::{Embed, Select};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

type Row = Map<String, Value>;

/// Kind of store call, for injecting failures and counting round trips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<String, Vec<Row>>,
    next_id: u64,
    failures: HashMap<StoreCall, StoreError>,
    calls: HashMap<StoreCall, usize>,
    silent_inserts: bool,
}

impl Tables {
    fn begin(&mut self, call: StoreCall) -> Result<(), StoreError> {
        *self.calls.entry(call).or_default() += 1;
        match self.failures.remove(&call) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn take_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn table(&self, table: &str) -> &[Row] {
        self.rows.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    fn shape(&self, row: &Row, select: &Select) -> Value {
        let mut shaped = if select.columns.is_empty() {
            row.clone()
        } else {
            project(row, &select.columns)
        };

        for embed in &select.embeds {
            shaped.insert(embed.alias.clone(), self.related(row, embed));
        }

        Value::Object(shaped)
    }

    fn related(&self, row: &Row, embed: &Embed) -> Value {
        let Some(key) = row.get(&embed.foreign_key).and_then(id_of) else {
            return Value::Null;
        };

        self.table(&embed.table)
            .iter()
            .find(|candidate| candidate.get("id").and_then(id_of).as_deref() == Some(key.as_str()))
            .map_or(Value::Null, |related| {
                if embed.columns.is_empty() {
                    Value::Object(related.clone())
                } else {
                    Value::Object(project(related, &embed.columns))
                }
            })
    }
}

fn project(row: &Row, columns: &[String]) -> Row {
    columns
        .iter()
        .filter_map(|column| row.get(column).map(|value| (column.clone(), value.clone())))
        .collect()
}

/// Textual form of an `id` column, whether stored as a number or a string
fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// In-process store keeping every table as a list of JSON rows.
///
/// Resolves embedded relations through their foreign key like the hosted
/// store does, assigns numeric ids on insert, and can be told to fail the
/// next call of a given kind.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::transport("memory store lock poisoned"))
    }

    /// Add a row as-is, assigning an id when it has none
    pub fn seed(&self, table: &str, row: Value) -> Result<(), StoreError> {
        let Value::Object(mut row) = row else {
            return Err(StoreError::rejected("seed rows must be JSON objects"));
        };

        let numeric_id = row.get("id").and_then(id_of).and_then(|id| id.parse::<u64>().ok());
        let mut tables = self.lock()?;
        match numeric_id {
            Some(id) => tables.next_id = tables.next_id.max(id),
            None if !row.contains_key("id") => {
                let id = tables.take_id();
                row.insert("id".to_string(), Value::from(id));
            }
            None => {}
        }
        tables.rows.entry(table.to_string()).or_default().push(row);

        Ok(())
    }

    /// Make the next call of kind `call` fail with `error`
    pub fn fail_next(&self, call: StoreCall, error: StoreError) -> Result<(), StoreError> {
        self.lock()?.failures.insert(call, error);
        Ok(())
    }

    /// Acknowledge inserts without returning the stored row
    pub fn answer_inserts_with_nothing(&self) -> Result<(), StoreError> {
        self.lock()?.silent_inserts = true;
        Ok(())
    }

    /// Number of calls of kind `call` made so far, failed ones included
    pub fn calls(&self, call: StoreCall) -> usize {
        self.lock()
            .map(|tables| tables.calls.get(&call).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Snapshot of the raw rows of `table`
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock()
            .map(|tables| {
                tables
                    .table(table)
                    .iter()
                    .cloned()
                    .map(Value::Object)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, table: &str, select: &Select) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.lock()?;
        tables.begin(StoreCall::Select)?;

        let rows = tables
            .table(table)
            .iter()
            .map(|row| tables.shape(row, select))
            .collect::<Vec<_>>();
        debug!("memory select from {} returned {} rows", table, rows.len());

        Ok(rows)
    }

    async fn insert(
        &self,
        table: &str,
        mut row: Map<String, Value>,
        select: &Select,
    ) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.lock()?;
        tables.begin(StoreCall::Insert)?;

        if !row.contains_key("id") {
            let id = tables.take_id();
            row.insert("id".to_string(), Value::from(id));
        }
        let shaped = tables.shape(&row, select);
        tables.rows.entry(table.to_string()).or_default().push(row);

        if tables.silent_inserts {
            return Ok(Vec::new());
        }
        Ok(vec![shaped])
    }

    async fn update(
        &self,
        table: &str,
        patch: Map<String, Value>,
        id: &str,
        select: &Select,
    ) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.lock()?;
        tables.begin(StoreCall::Update)?;

        let mut updated = Vec::new();
        if let Some(rows) = tables.rows.get_mut(table) {
            for row in rows.iter_mut() {
                if row.get("id").and_then(id_of).as_deref() == Some(id) {
                    for (key, value) in &patch {
                        row.insert(key.clone(), value.clone());
                    }
                    updated.push(row.clone());
                }
            }
        }

        Ok(updated.iter().map(|row| tables.shape(row, select)).collect())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        tables.begin(StoreCall::Delete)?;

        if let Some(rows) = tables.rows.get_mut(table) {
            rows.retain(|row| row.get("id").and_then(id_of).as_deref() != Some(id));
        }

        Ok(())
    }
}
