use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Project configuration relevant to schema sync: which data classification
/// config governs the project's databases.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub resource_id: String,
    pub data_classification_config_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct CreateProject {
    pub resource_id: String,
    pub data_classification_config_id: String,
}

impl CreateProject {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            data_classification_config_id: String::new(),
        }
    }

    pub fn data_classification_config_id(mut self, id: impl Into<String>) -> Self {
        self.data_classification_config_id = id.into();
        self
    }
}

impl From<CreateProject> for ActiveModel {
    fn from(req: CreateProject) -> Self {
        Self {
            resource_id: Set(req.resource_id),
            data_classification_config_id: Set(req.data_classification_config_id),
        }
    }
}
