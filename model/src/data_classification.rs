use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// A data classification config. `classification_from_config` selects where
/// classification identifiers come from: the config tree itself, or parsed
/// out of object comments.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "data_classification_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub classification_from_config: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateDataClassificationConfig {
    pub id: String,
    pub classification_from_config: bool,
}

impl From<CreateDataClassificationConfig> for ActiveModel {
    fn from(req: CreateDataClassificationConfig) -> Self {
        Self {
            id: Set(req.id),
            classification_from_config: Set(req.classification_from_config),
        }
    }
}
