use crate::errors::CatalogError;
use crate::store::Store;
use model::db_schema::config::DatabaseConfig;
use model::db_schema::metadata::DatabaseSchemaMetadata;
use model::db_schema::{self, Entity as DbSchemaEntity};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;

pub struct SchemaCatalog {
    db: Store,
}

impl SchemaCatalog {
    pub fn new(db: Store) -> Arc<Self> {
        Arc::new(Self { db })
    }

    pub async fn get_schema(
        &self,
        database_uid: i64,
    ) -> Result<Option<db_schema::Model>, CatalogError> {
        Ok(DbSchemaEntity::find()
            .filter(db_schema::Column::DatabaseUid.eq(database_uid))
            .one(&self.db.conn)
            .await?)
    }

    /// Insert or replace the snapshot for one database. The latest snapshot
    /// always reflects the last non-equal observation.
    pub async fn upsert_schema(
        &self,
        database_uid: i64,
        metadata: &DatabaseSchemaMetadata,
        raw_dump: &str,
        config: &DatabaseConfig,
    ) -> Result<db_schema::Model, CatalogError> {
        match self.get_schema(database_uid).await? {
            Some(existing) => {
                let mut active: db_schema::ActiveModel = existing.into();
                active.metadata = Set(metadata.clone());
                active.raw_dump = Set(raw_dump.to_owned());
                active.config = Set(config.clone());
                Ok(active.update(&self.db.conn).await?)
            }
            None => {
                let active = db_schema::ActiveModel {
                    id: NotSet,
                    database_uid: Set(database_uid),
                    metadata: Set(metadata.clone()),
                    raw_dump: Set(raw_dump.to_owned()),
                    config: Set(config.clone()),
                };
                Ok(active.insert(&self.db.conn).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_catalog::DatabaseCatalog;
    use crate::store::Store;
    use model::database::CreateDatabase;
    use model::db_schema::metadata::{SchemaMetadata, TableMetadata};

    fn metadata_with_table(table: &str) -> DatabaseSchemaMetadata {
        DatabaseSchemaMetadata {
            name: "orders".to_owned(),
            schemas: vec![SchemaMetadata {
                name: String::new(),
                tables: vec![TableMetadata::named(table)],
            }],
            ..DatabaseSchemaMetadata::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_schema_roundtrip() {
        let db = Store::for_test().await;
        let databases = DatabaseCatalog::new(db.clone());
        let catalog = SchemaCatalog::new(db);

        let database = databases
            .create_database(CreateDatabase::discovered("prod-mysql", "orders"))
            .await
            .unwrap();

        assert!(catalog.get_schema(database.uid).await.unwrap().is_none());

        let metadata = metadata_with_table("customer");
        let created = catalog
            .upsert_schema(
                database.uid,
                &metadata,
                "CREATE TABLE customer ();",
                &DatabaseConfig::default(),
            )
            .await
            .unwrap();
        assert_eq!(created.metadata, metadata);
        assert_eq!(created.raw_dump, "CREATE TABLE customer ();");

        // Upsert replaces in place, keeping one row per database.
        let metadata = metadata_with_table("invoice");
        let updated = catalog
            .upsert_schema(
                database.uid,
                &metadata,
                "CREATE TABLE invoice ();",
                &DatabaseConfig::default(),
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.metadata, metadata);

        let stored = catalog.get_schema(database.uid).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }
}
