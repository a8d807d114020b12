pub mod config;
pub mod metadata;

use config::DatabaseConfig;
use metadata::DatabaseSchemaMetadata;
use sea_orm::entity::prelude::*;

/// The persisted schema snapshot of one database: the structured metadata
/// tree, the textual dump it was last regenerated from, and the internal
/// classification config built alongside it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "db_schema")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub database_uid: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: DatabaseSchemaMetadata,
    #[sea_orm(column_type = "Text")]
    pub raw_dump: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub config: DatabaseConfig,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::database::Entity",
        from = "Column::DatabaseUid",
        to = "crate::database::Column::Uid"
    )]
    Database,
}

impl Related<crate::database::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Database.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
