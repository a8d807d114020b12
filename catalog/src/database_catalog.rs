use crate::errors::CatalogError;
use crate::store::Store;
use model::IntoCondition;
use model::database::{self, CreateDatabase, Entity as DatabaseEntity, GetDatabase, UpdateDatabase};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;

pub struct DatabaseCatalog {
    db: Store,
}

impl DatabaseCatalog {
    pub fn new(db: Store) -> Arc<Self> {
        Arc::new(Self { db })
    }

    pub async fn create_database(
        &self,
        req: CreateDatabase,
    ) -> Result<database::Model, CatalogError> {
        Ok(database::ActiveModel::from(req).insert(&self.db.conn).await?)
    }

    pub async fn get_databases(
        &self,
        req: GetDatabase,
    ) -> Result<Vec<database::Model>, CatalogError> {
        Ok(DatabaseEntity::find()
            .filter(req.into_condition())
            .all(&self.db.conn)
            .await?)
    }

    pub async fn find_database(
        &self,
        instance_id: &str,
        database_name: &str,
    ) -> Result<Option<database::Model>, CatalogError> {
        Ok(DatabaseEntity::find()
            .filter(database::Column::InstanceId.eq(instance_id))
            .filter(database::Column::DatabaseName.eq(database_name))
            .one(&self.db.conn)
            .await?)
    }

    pub async fn update_database(
        &self,
        req: UpdateDatabase,
    ) -> Result<database::Model, CatalogError> {
        let existing = self
            .find_database(&req.instance_id, &req.database_name)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(format!(
                    "database {}/{}",
                    req.instance_id, req.database_name
                ))
            })?;

        let mut active: database::ActiveModel = existing.into();
        if let Some(sync_state) = req.sync_state {
            active.sync_state = Set(sync_state);
        }
        if let Some(ts) = req.successful_sync_time_ts {
            active.successful_sync_time_ts = Set(Some(ts));
        }
        if let Some(metadata) = req.metadata {
            active.metadata = Set(metadata);
        }
        Ok(active.update(&self.db.conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use model::DEFAULT_PROJECT_ID;
    use model::database::{DatabaseMetadata, SyncState};

    #[tokio::test]
    async fn test_discovered_database_defaults() {
        let db = Store::for_test().await;
        let catalog = DatabaseCatalog::new(db);

        let created = catalog
            .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
            .await
            .expect("Database creation should succeed");

        assert_eq!(created.project_id, DEFAULT_PROJECT_ID);
        assert_eq!(created.sync_state, SyncState::Ok);
        assert!(!created.data_share);
        assert_eq!(created.successful_sync_time_ts, None);
    }

    #[tokio::test]
    async fn test_database_name_unique_per_instance() {
        let db = Store::for_test().await;
        let catalog = DatabaseCatalog::new(db);

        catalog
            .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
            .await
            .unwrap();
        assert!(catalog
            .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
            .await
            .is_err());
        // Same name on another instance is fine.
        catalog
            .create_database(CreateDatabase::discovered("staging-mysql", "orders"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_database_partial_fields() {
        let db = Store::for_test().await;
        let catalog = DatabaseCatalog::new(db);

        catalog
            .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
            .await
            .unwrap();

        let now = chrono::Utc::now();
        let updated = catalog
            .update_database(
                UpdateDatabase::new("prod-mysql", "orders")
                    .sync_state(SyncState::NotFound)
                    .successful_sync_time_ts(now.timestamp())
                    .metadata(DatabaseMetadata {
                        last_sync_time: Some(now),
                    }),
            )
            .await
            .unwrap();
        assert_eq!(updated.sync_state, SyncState::NotFound);
        assert_eq!(updated.successful_sync_time_ts, Some(now.timestamp()));
        assert_eq!(updated.metadata.last_sync_time, Some(now));

        // A bare update touches nothing.
        let untouched = catalog
            .update_database(UpdateDatabase::new("prod-mysql", "orders"))
            .await
            .unwrap();
        assert_eq!(untouched.sync_state, SyncState::NotFound);
        assert_eq!(untouched.metadata.last_sync_time, Some(now));

        let missing = catalog
            .update_database(UpdateDatabase::new("prod-mysql", "absent"))
            .await;
        assert!(matches!(missing, Err(CatalogError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_databases_filters() {
        let db = Store::for_test().await;
        let catalog = DatabaseCatalog::new(db);

        catalog
            .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
            .await
            .unwrap();
        catalog
            .create_database(CreateDatabase::discovered("prod-mysql", "billing"))
            .await
            .unwrap();
        catalog
            .create_database(CreateDatabase::discovered("staging-mysql", "orders"))
            .await
            .unwrap();
        catalog
            .update_database(
                UpdateDatabase::new("prod-mysql", "billing").sync_state(SyncState::NotFound),
            )
            .await
            .unwrap();

        let prod = catalog
            .get_databases(GetDatabase::all().with_instance_id("prod-mysql"))
            .await
            .unwrap();
        assert_eq!(prod.len(), 2);

        let healthy = catalog
            .get_databases(
                GetDatabase::all()
                    .with_instance_id("prod-mysql")
                    .with_sync_state(SyncState::Ok),
            )
            .await
            .unwrap();
        assert_eq!(healthy.len(), 1);
        assert_eq!(healthy[0].database_name, "orders");
    }
}
