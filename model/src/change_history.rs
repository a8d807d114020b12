use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

/// One applied change revision for a database. The row with the highest id
/// is the latest applied revision; its `schema` field records the full dump
/// taken right after the change was applied.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "change_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub instance_uid: i64,
    pub database_uid: i64,
    pub version: String,
    #[sea_orm(column_type = "Text")]
    pub schema: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateChangeHistory {
    pub instance_uid: i64,
    pub database_uid: i64,
    pub version: String,
    pub schema: String,
}

impl From<CreateChangeHistory> for ActiveModel {
    fn from(req: CreateChangeHistory) -> Self {
        Self {
            id: NotSet,
            instance_uid: Set(req.instance_uid),
            database_uid: Set(req.database_uid),
            version: Set(req.version),
            schema: Set(req.schema),
        }
    }
}
