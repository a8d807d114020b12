use crate::errors::CatalogError;
use crate::store::Store;
use model::IntoCondition;
use model::anomaly::{self, ArchiveAnomaly, Entity as AnomalyEntity, GetAnomaly, UpsertAnomaly};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter};
use std::sync::Arc;

pub struct AnomalyCatalog {
    db: Store,
}

impl AnomalyCatalog {
    pub fn new(db: Store) -> Arc<Self> {
        Arc::new(Self { db })
    }

    /// Create the active anomaly for `(subject, type)`, or refresh its
    /// payload if one is already open. Keeps at most one active row per
    /// subject and type.
    pub async fn upsert_active_anomaly(
        &self,
        req: UpsertAnomaly,
    ) -> Result<anomaly::Model, CatalogError> {
        let mut condition = Condition::all()
            .add(anomaly::Column::InstanceId.eq(req.instance_id.clone()))
            .add(anomaly::Column::AnomalyType.eq(req.anomaly_type))
            .add(anomaly::Column::Archived.eq(false));
        condition = match req.database_uid {
            Some(uid) => condition.add(anomaly::Column::DatabaseUid.eq(uid)),
            None => condition.add(anomaly::Column::DatabaseUid.is_null()),
        };

        match AnomalyEntity::find()
            .filter(condition)
            .one(&self.db.conn)
            .await?
        {
            Some(existing) => {
                let mut active: anomaly::ActiveModel = existing.into();
                active.payload = Set(req.payload);
                Ok(active.update(&self.db.conn).await?)
            }
            None => Ok(anomaly::ActiveModel::from(req).insert(&self.db.conn).await?),
        }
    }

    /// Archive the active anomaly identified by `req`. Returns `NotFound`
    /// when no active row matches, which recovery paths tolerate.
    pub async fn archive_anomaly(&self, req: ArchiveAnomaly) -> Result<(), CatalogError> {
        let condition = Condition::all()
            .add(anomaly::Column::AnomalyType.eq(req.anomaly_type))
            .add(anomaly::Column::Archived.eq(false))
            .add_option(req.instance_id.map(|v| anomaly::Column::InstanceId.eq(v)))
            .add_option(req.database_uid.map(|v| anomaly::Column::DatabaseUid.eq(v)));

        let result = AnomalyEntity::update_many()
            .col_expr(anomaly::Column::Archived, Expr::value(true))
            .filter(condition)
            .exec(&self.db.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::not_found(format!(
                "active {} anomaly",
                req.anomaly_type
            )));
        }
        Ok(())
    }

    pub async fn get_anomalies(&self, req: GetAnomaly) -> Result<Vec<anomaly::Model>, CatalogError> {
        Ok(AnomalyEntity::find()
            .filter(req.into_condition())
            .all(&self.db.conn)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use model::anomaly::AnomalyType;

    fn connection_anomaly(detail: &str) -> UpsertAnomaly {
        UpsertAnomaly {
            instance_id: "prod-mysql".to_owned(),
            database_uid: None,
            anomaly_type: AnomalyType::InstanceConnection,
            payload: format!(r#"{{"Detail":"{detail}"}}"#),
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_single_active_row() {
        let db = Store::for_test().await;
        let catalog = AnomalyCatalog::new(db);

        let first = catalog
            .upsert_active_anomaly(connection_anomaly("refused"))
            .await
            .unwrap();
        let second = catalog
            .upsert_active_anomaly(connection_anomaly("timed out"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.payload, r#"{"Detail":"timed out"}"#);

        let active = catalog
            .get_anomalies(
                GetAnomaly::all()
                    .with_instance_id("prod-mysql")
                    .with_anomaly_type(AnomalyType::InstanceConnection)
                    .active(),
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_archive_then_reopen_creates_fresh_row() {
        let db = Store::for_test().await;
        let catalog = AnomalyCatalog::new(db);

        let first = catalog
            .upsert_active_anomaly(connection_anomaly("refused"))
            .await
            .unwrap();
        catalog
            .archive_anomaly(ArchiveAnomaly::instance(
                "prod-mysql",
                AnomalyType::InstanceConnection,
            ))
            .await
            .unwrap();

        // Archiving again reports NotFound; the caller decides to swallow it.
        let err = catalog
            .archive_anomaly(ArchiveAnomaly::instance(
                "prod-mysql",
                AnomalyType::InstanceConnection,
            ))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let reopened = catalog
            .upsert_active_anomaly(connection_anomaly("refused again"))
            .await
            .unwrap();
        assert_ne!(reopened.id, first.id);

        let all = catalog
            .get_anomalies(GetAnomaly::all().with_instance_id("prod-mysql"))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|a| a.archived));
    }

    #[tokio::test]
    async fn test_database_and_instance_subjects_do_not_collide() {
        let db = Store::for_test().await;
        let catalog = AnomalyCatalog::new(db);

        catalog
            .upsert_active_anomaly(connection_anomaly("refused"))
            .await
            .unwrap();
        catalog
            .upsert_active_anomaly(UpsertAnomaly {
                instance_id: "prod-mysql".to_owned(),
                database_uid: Some(42),
                anomaly_type: AnomalyType::DatabaseConnection,
                payload: r#"{"Detail":"refused"}"#.to_owned(),
            })
            .await
            .unwrap();

        // Archiving the database anomaly leaves the instance one open.
        catalog
            .archive_anomaly(ArchiveAnomaly::database(
                42,
                AnomalyType::DatabaseConnection,
            ))
            .await
            .unwrap();
        let active = catalog
            .get_anomalies(GetAnomaly::all().with_instance_id("prod-mysql").active())
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].anomaly_type, AnomalyType::InstanceConnection);
    }
}
