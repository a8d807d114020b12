use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// The full metadata tree of one database as observed by a driver:
/// `Database → Schema → Table → Column`. Engines without named schemas
/// report a single schema with an empty name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct DatabaseSchemaMetadata {
    pub name: String,
    pub character_set: String,
    pub collation: String,
    pub schemas: Vec<SchemaMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub name: String,
    pub tables: Vec<TableMetadata>,
}

/// Table-level metadata. `row_count`, `data_size`, `index_size` and
/// `data_free` are volatile statistics: they move on every probe and never
/// count as schema change on their own.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: String,
    pub engine: String,
    pub collation: String,
    pub comment: String,
    pub user_comment: String,
    pub classification: String,
    pub row_count: i64,
    pub data_size: i64,
    pub index_size: i64,
    pub data_free: i64,
    pub columns: Vec<ColumnMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub position: i32,
    pub r#type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub character_set: String,
    pub collation: String,
    pub comment: String,
    pub user_comment: String,
    pub classification: String,
}

impl SchemaMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl TableMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl ColumnMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
