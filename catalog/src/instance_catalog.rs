use crate::errors::CatalogError;
use crate::store::Store;
use model::IntoCondition;
use model::instance::{self, CreateInstance, Entity as InstanceEntity, GetInstance, UpdateInstance};
use model::instance_user::{self, Entity as InstanceUserEntity, UpsertInstanceUser};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;

pub struct InstanceCatalog {
    db: Store,
}

impl InstanceCatalog {
    pub fn new(db: Store) -> Arc<Self> {
        Arc::new(Self { db })
    }

    pub async fn create_instance(
        &self,
        req: CreateInstance,
    ) -> Result<instance::Model, CatalogError> {
        Ok(instance::ActiveModel::from(req).insert(&self.db.conn).await?)
    }

    pub async fn get_instances(
        &self,
        req: GetInstance,
    ) -> Result<Vec<instance::Model>, CatalogError> {
        Ok(InstanceEntity::find()
            .filter(req.into_condition())
            .all(&self.db.conn)
            .await?)
    }

    pub async fn find_instance(
        &self,
        resource_id: &str,
    ) -> Result<Option<instance::Model>, CatalogError> {
        Ok(InstanceEntity::find()
            .filter(instance::Column::ResourceId.eq(resource_id))
            .one(&self.db.conn)
            .await?)
    }

    pub async fn update_instance(
        &self,
        req: UpdateInstance,
    ) -> Result<instance::Model, CatalogError> {
        let existing = self
            .find_instance(&req.resource_id)
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("instance {}", req.resource_id)))?;

        let mut active: instance::ActiveModel = existing.into();
        active.metadata = Set(req.metadata);
        if let Some(version) = req.engine_version {
            active.engine_version = Set(version);
        }
        Ok(active.update(&self.db.conn).await?)
    }

    /// Replace the instance's whole role set with the probed one.
    pub async fn replace_instance_users(
        &self,
        instance_uid: i64,
        users: Vec<UpsertInstanceUser>,
    ) -> Result<(), CatalogError> {
        let txn = self.db.conn.begin().await?;
        InstanceUserEntity::delete_many()
            .filter(instance_user::Column::InstanceUid.eq(instance_uid))
            .exec(&txn)
            .await?;
        if !users.is_empty() {
            InstanceUserEntity::insert_many(users.into_iter().map(|user| {
                instance_user::ActiveModel {
                    id: NotSet,
                    instance_uid: Set(instance_uid),
                    name: Set(user.name),
                    grant: Set(user.grant),
                }
            }))
            .exec(&txn)
            .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    pub async fn get_instance_users(
        &self,
        instance_uid: i64,
    ) -> Result<Vec<instance_user::Model>, CatalogError> {
        Ok(InstanceUserEntity::find()
            .filter(instance_user::Column::InstanceUid.eq(instance_uid))
            .order_by_asc(instance_user::Column::Name)
            .all(&self.db.conn)
            .await?)
    }
}
