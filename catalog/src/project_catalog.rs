use crate::errors::CatalogError;
use crate::store::Store;
use model::data_classification::{
    self, CreateDataClassificationConfig, Entity as DataClassificationEntity,
};
use model::project::{self, CreateProject, Entity as ProjectEntity};
use sea_orm::{ActiveModelTrait, EntityTrait};
use std::sync::Arc;

pub struct ProjectCatalog {
    db: Store,
}

impl ProjectCatalog {
    pub fn new(db: Store) -> Arc<Self> {
        Arc::new(Self { db })
    }

    pub async fn create_project(&self, req: CreateProject) -> Result<project::Model, CatalogError> {
        Ok(project::ActiveModel::from(req).insert(&self.db.conn).await?)
    }

    pub async fn find_project(
        &self,
        resource_id: &str,
    ) -> Result<Option<project::Model>, CatalogError> {
        Ok(ProjectEntity::find_by_id(resource_id).one(&self.db.conn).await?)
    }

    pub async fn create_classification_config(
        &self,
        req: CreateDataClassificationConfig,
    ) -> Result<data_classification::Model, CatalogError> {
        Ok(data_classification::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await?)
    }

    pub async fn find_classification_config(
        &self,
        id: &str,
    ) -> Result<Option<data_classification::Model>, CatalogError> {
        if id.is_empty() {
            return Ok(None);
        }
        Ok(DataClassificationEntity::find_by_id(id)
            .one(&self.db.conn)
            .await?)
    }
}
