use crate::driver::DriverError;
use catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to connect to instance {instance}")]
    InstanceConnection {
        instance: String,
        #[source]
        source: DriverError,
    },

    #[error("failed to connect to database {database} on instance {instance}")]
    DatabaseConnection {
        instance: String,
        database: String,
        #[source]
        source: DriverError,
    },

    #[error("failed to sync instance {instance}")]
    SyncInstance {
        instance: String,
        #[source]
        source: DriverError,
    },

    #[error("failed to sync database schema for database {database}")]
    SyncSchema {
        database: String,
        #[source]
        source: DriverError,
    },

    #[error("failed to dump database schema for database {database}")]
    Dump {
        database: String,
        #[source]
        source: DriverError,
    },

    #[error("instance {0} not found")]
    InstanceNotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
