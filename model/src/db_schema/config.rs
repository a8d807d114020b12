use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classification config tree parallel to the metadata tree:
/// `Database → Schema → Table → Column`. Nodes that carry no information are
/// pruned bottom-up, so an empty tree serializes to an empty document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct DatabaseConfig {
    pub schemas: BTreeMap<String, SchemaConfig>,
}

impl DatabaseConfig {
    pub fn schema_entry(&mut self, name: &str) -> &mut SchemaConfig {
        self.schemas.entry(name.to_owned()).or_default()
    }

    pub fn remove_schema(&mut self, name: &str) {
        self.schemas.remove(name);
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub tables: BTreeMap<String, TableConfig>,
}

impl SchemaConfig {
    pub fn table_entry(&mut self, name: &str) -> &mut TableConfig {
        self.tables.entry(name.to_owned()).or_default()
    }

    pub fn remove_table(&mut self, name: &str) {
        self.tables.remove(name);
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub classification_id: String,
    pub columns: BTreeMap<String, ColumnConfig>,
}

impl TableConfig {
    pub fn column_entry(&mut self, name: &str) -> &mut ColumnConfig {
        self.columns.entry(name.to_owned()).or_default()
    }

    pub fn remove_column(&mut self, name: &str) {
        self.columns.remove(name);
    }

    pub fn is_empty(&self) -> bool {
        self.classification_id.is_empty() && self.columns.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub classification_id: String,
    pub semantic_type_id: String,
    pub labels: BTreeMap<String, String>,
}

impl ColumnConfig {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.classification_id.is_empty() && self.semantic_type_id.is_empty()
    }
}
