//! Published schema snapshots
//!
//! Readers take an `Arc<Table>` and keep it for the lifetime of a request.
//! A reload publishes a fresh `Table`; requests already holding the old
//! snapshot are unaffected.

use crate::{CodecResult, SchemaError, Table};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Thread-safe map of table name to its current snapshot.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    tables: Arc<RwLock<HashMap<String, Arc<Table>>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a table, returning the snapshot it replaced.
    pub fn publish(&self, table: Table) -> CodecResult<Option<Arc<Table>>> {
        let name = table.name().to_string();
        let version = table.version();
        let mut tables = self
            .tables
            .write()
            .map_err(|_| SchemaError::LockPoisoned)?;
        let previous = tables.insert(name.clone(), Arc::new(table));
        debug!(
            table = %name,
            version,
            replaced_version = previous.as_ref().map(|t| t.version()),
            "published schema snapshot"
        );
        Ok(previous)
    }

    /// Current snapshot for a table.
    pub fn get(&self, name: &str) -> CodecResult<Option<Arc<Table>>> {
        let tables = self.tables.read().map_err(|_| SchemaError::LockPoisoned)?;
        Ok(tables.get(name).cloned())
    }

    /// Drop a table, returning its last snapshot.
    pub fn remove(&self, name: &str) -> CodecResult<Option<Arc<Table>>> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| SchemaError::LockPoisoned)?;
        Ok(tables.remove(name))
    }

    /// Names of all published tables, sorted.
    pub fn table_names(&self) -> CodecResult<Vec<String>> {
        let tables = self.tables.read().map_err(|_| SchemaError::LockPoisoned)?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
