use async_trait::async_trait;
use model::db_schema::metadata::DatabaseSchemaMetadata;
use model::instance::InstanceMetadata;
use model::{database, instance};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("driver call timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Execution(String),
}

/// Result of probing an instance: its server version, engine-level metadata,
/// the databases it hosts and its instance-level roles.
#[derive(Clone, Debug, Default)]
pub struct InstanceProbe {
    pub version: String,
    pub metadata: InstanceMetadata,
    pub databases: Vec<DatabaseProbe>,
    pub instance_roles: Vec<InstanceRole>,
}

#[derive(Clone, Debug, Default)]
pub struct DatabaseProbe {
    pub name: String,
    pub datashare: bool,
    pub service_name: String,
}

#[derive(Clone, Debug, Default)]
pub struct InstanceRole {
    pub name: String,
    pub grant: String,
}

/// An engine driver session bound to the admin role. Implementations live in
/// per-engine plugins; the sync runner only consumes this contract.
#[async_trait]
pub trait Driver: Send {
    async fn sync_instance(&mut self) -> Result<InstanceProbe, DriverError>;

    async fn sync_db_schema(&mut self) -> Result<DatabaseSchemaMetadata, DriverError>;

    /// Append a textual schema dump to `out`.
    async fn dump(&mut self, out: &mut String) -> Result<(), DriverError>;

    async fn close(&mut self);
}

/// Opens short-lived admin sessions against an instance, or against one of
/// its databases when `database` is given. Connect failures are connection
/// errors in the anomaly sense.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn open_admin(
        &self,
        instance: &instance::Model,
        database: Option<&database::Model>,
    ) -> Result<Box<dyn Driver>, DriverError>;
}

/// A driver session whose every call runs under a hard deadline. The session
/// must be closed on all exit paths; sync tasks run their fallible body
/// first and then call `close` exactly once.
pub struct AdminSession {
    driver: Box<dyn Driver>,
    deadline: Duration,
}

impl AdminSession {
    pub fn new(driver: Box<dyn Driver>, deadline: Duration) -> Self {
        Self { driver, deadline }
    }

    pub async fn sync_instance(&mut self) -> Result<InstanceProbe, DriverError> {
        timeout(self.deadline, self.driver.sync_instance())
            .await
            .map_err(|_| DriverError::Timeout(self.deadline))?
    }

    pub async fn sync_db_schema(&mut self) -> Result<DatabaseSchemaMetadata, DriverError> {
        timeout(self.deadline, self.driver.sync_db_schema())
            .await
            .map_err(|_| DriverError::Timeout(self.deadline))?
    }

    pub async fn dump(&mut self, out: &mut String) -> Result<(), DriverError> {
        timeout(self.deadline, self.driver.dump(out))
            .await
            .map_err(|_| DriverError::Timeout(self.deadline))?
    }

    pub async fn close(mut self) {
        self.driver.close().await;
    }
}
