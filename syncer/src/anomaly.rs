use crate::driver::DriverError;
use catalog::Catalog;
use model::anomaly::{
    AnomalyType, ArchiveAnomaly, DatabaseConnectionPayload, InstanceConnectionPayload,
    SchemaDriftPayload, UpsertAnomaly,
};
use model::{database, instance};
use std::sync::Arc;
use tracing::error;

/// Idempotently opens and closes anomalies. Store and serialization failures
/// are logged and swallowed: anomaly bookkeeping must never fail the sync
/// task that triggered it.
pub struct AnomalyReporter {
    catalog: Arc<Catalog>,
}

impl AnomalyReporter {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Open an instance connection anomaly carrying `err`, or archive the
    /// active one when the connection is healthy again.
    pub async fn report_instance_connection(
        &self,
        instance: &instance::Model,
        err: Option<&DriverError>,
    ) {
        let Some(err) = err else {
            self.archive(
                ArchiveAnomaly::instance(&instance.resource_id, AnomalyType::InstanceConnection),
                &instance.resource_id,
                None,
            )
            .await;
            return;
        };

        let payload = InstanceConnectionPayload {
            detail: err.to_string(),
        };
        let Some(payload) = self.marshal(&payload, &instance.resource_id, None) else {
            return;
        };
        self.upsert(
            UpsertAnomaly {
                instance_id: instance.resource_id.clone(),
                database_uid: None,
                anomaly_type: AnomalyType::InstanceConnection,
                payload,
            },
            &instance.resource_id,
            None,
        )
        .await;
    }

    /// Database-level counterpart of `report_instance_connection`, keyed on
    /// the database UID.
    pub async fn report_database_connection(
        &self,
        instance: &instance::Model,
        database: &database::Model,
        err: Option<&DriverError>,
    ) {
        let Some(err) = err else {
            self.archive(
                ArchiveAnomaly::database(database.uid, AnomalyType::DatabaseConnection),
                &instance.resource_id,
                Some(&database.database_name),
            )
            .await;
            return;
        };

        let payload = DatabaseConnectionPayload {
            detail: err.to_string(),
        };
        let Some(payload) =
            self.marshal(&payload, &instance.resource_id, Some(&database.database_name))
        else {
            return;
        };
        self.upsert(
            UpsertAnomaly {
                instance_id: instance.resource_id.clone(),
                database_uid: Some(database.uid),
                anomaly_type: AnomalyType::DatabaseConnection,
                payload,
            },
            &instance.resource_id,
            Some(&database.database_name),
        )
        .await;
    }

    /// Compare the expected dump from change history with the actual one; a
    /// mismatch opens (or refreshes) a drift anomaly, a match archives it.
    pub async fn report_schema_drift(
        &self,
        instance: &instance::Model,
        database: &database::Model,
        version: &str,
        expect: &str,
        actual: &str,
    ) {
        if expect == actual {
            self.archive(
                ArchiveAnomaly::database(database.uid, AnomalyType::DatabaseSchemaDrift),
                &instance.resource_id,
                Some(&database.database_name),
            )
            .await;
            return;
        }

        let payload = SchemaDriftPayload {
            version: version.to_owned(),
            expect: expect.to_owned(),
            actual: actual.to_owned(),
        };
        let Some(payload) =
            self.marshal(&payload, &instance.resource_id, Some(&database.database_name))
        else {
            return;
        };
        self.upsert(
            UpsertAnomaly {
                instance_id: instance.resource_id.clone(),
                database_uid: Some(database.uid),
                anomaly_type: AnomalyType::DatabaseSchemaDrift,
                payload,
            },
            &instance.resource_id,
            Some(&database.database_name),
        )
        .await;
    }

    fn marshal<T: serde::Serialize>(
        &self,
        payload: &T,
        instance: &str,
        database: Option<&str>,
    ) -> Option<String> {
        match serde_json::to_string(payload) {
            Ok(payload) => Some(payload),
            Err(err) => {
                error!(
                    instance,
                    database,
                    error = %err,
                    "failed to marshal anomaly payload"
                );
                None
            }
        }
    }

    async fn upsert(&self, req: UpsertAnomaly, instance: &str, database: Option<&str>) {
        let anomaly_type = req.anomaly_type;
        if let Err(err) = self.catalog.anomaly.upsert_active_anomaly(req).await {
            error!(
                instance,
                database,
                anomaly_type = %anomaly_type,
                error = %err,
                "failed to create anomaly"
            );
        }
    }

    async fn archive(&self, req: ArchiveAnomaly, instance: &str, database: Option<&str>) {
        let anomaly_type = req.anomaly_type;
        match self.catalog.anomaly.archive_anomaly(req).await {
            Ok(()) => {}
            // Nothing was open; recovery is idempotent.
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                error!(
                    instance,
                    database,
                    anomaly_type = %anomaly_type,
                    error = %err,
                    "failed to close anomaly"
                );
            }
        }
    }
}
