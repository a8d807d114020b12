use crate::errors::CatalogError;
use crate::store::Store;
use model::change_history::{self, CreateChangeHistory, Entity as ChangeHistoryEntity};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;

pub struct ChangeHistoryCatalog {
    db: Store,
}

impl ChangeHistoryCatalog {
    pub fn new(db: Store) -> Arc<Self> {
        Arc::new(Self { db })
    }

    pub async fn create_change_history(
        &self,
        req: CreateChangeHistory,
    ) -> Result<change_history::Model, CatalogError> {
        Ok(change_history::ActiveModel::from(req)
            .insert(&self.db.conn)
            .await?)
    }

    /// The most recently applied revision for one database, if any.
    pub async fn find_latest(
        &self,
        instance_uid: i64,
        database_uid: i64,
    ) -> Result<Option<change_history::Model>, CatalogError> {
        Ok(ChangeHistoryEntity::find()
            .filter(change_history::Column::InstanceUid.eq(instance_uid))
            .filter(change_history::Column::DatabaseUid.eq(database_uid))
            .order_by_desc(change_history::Column::Id)
            .one(&self.db.conn)
            .await?)
    }
}
