pub mod anomaly_catalog;
pub mod change_history_catalog;
pub mod database_catalog;
pub mod errors;
pub mod instance_catalog;
pub mod project_catalog;
pub mod schema_catalog;
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use errors::CatalogError;

use anomaly_catalog::AnomalyCatalog;
use change_history_catalog::ChangeHistoryCatalog;
use database_catalog::DatabaseCatalog;
use instance_catalog::InstanceCatalog;
use project_catalog::ProjectCatalog;
use schema_catalog::SchemaCatalog;
use std::sync::Arc;
use store::Store;

/// Facade providing access to all catalog domains.
///
/// Each catalog manages a specific domain (instances, databases, schema
/// snapshots, change histories, anomalies, projects) while sharing the same
/// underlying store connection.
#[derive(Clone)]
pub struct Catalog {
    pub instance: Arc<InstanceCatalog>,
    pub database: Arc<DatabaseCatalog>,
    pub schema: Arc<SchemaCatalog>,
    pub change_history: Arc<ChangeHistoryCatalog>,
    pub anomaly: Arc<AnomalyCatalog>,
    pub project: Arc<ProjectCatalog>,
}

impl Catalog {
    pub fn from(db: Store) -> Arc<Self> {
        Arc::new(Self {
            instance: InstanceCatalog::new(db.clone()),
            database: DatabaseCatalog::new(db.clone()),
            schema: SchemaCatalog::new(db.clone()),
            change_history: ChangeHistoryCatalog::new(db.clone()),
            anomaly: AnomalyCatalog::new(db.clone()),
            project: ProjectCatalog::new(db),
        })
    }

    #[cfg(any(test, feature = "testing"))]
    pub async fn for_test() -> Arc<Self> {
        Self::from(Store::for_test().await)
    }
}
