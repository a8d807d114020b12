use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use std::time::Duration;

/// Storage backend selection for the metadata store.
pub enum StateBackend {
    /// Private in-memory SQLite. Used by tests and throwaway runs.
    Memory,
    Sqlite {
        endpoint: String,
        opts: ConnectOptions,
    },
    Postgres {
        endpoint: String,
        opts: ConnectOptions,
    },
}

/// Shared handle to the metadata store connection.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    pub endpoint: String,
}

impl Store {
    pub async fn with(backend: StateBackend) -> Result<Self> {
        // An in-memory SQLite database exists per connection, so the pool is
        // pinned to a single connection and acquire must never time out under
        // concurrent sync tasks.
        const MAX_DURATION: Duration = Duration::new(u64::MAX / 4, 0);

        match backend {
            StateBackend::Memory => {
                const IN_MEMORY_DB: &str = "sqlite::memory:";

                let conn = sea_orm::Database::connect(
                    ConnectOptions::new(IN_MEMORY_DB)
                        .min_connections(1)
                        .max_connections(1)
                        .acquire_timeout(MAX_DURATION)
                        .connect_timeout(MAX_DURATION)
                        .to_owned(),
                )
                .await?;
                Ok(Self {
                    conn,
                    endpoint: IN_MEMORY_DB.to_owned(),
                })
            }
            StateBackend::Sqlite { endpoint, opts } | StateBackend::Postgres { endpoint, opts } => {
                let conn = sea_orm::Database::connect(opts).await?;
                Ok(Self { conn, endpoint })
            }
        }
    }

    #[cfg(any(test, feature = "testing"))]
    pub async fn for_test() -> Self {
        let this = Self::with(StateBackend::Memory)
            .await
            .expect("failed to open in-memory store");
        Migrator::up(&this.conn, None)
            .await
            .expect("failed to migrate in-memory store");
        this
    }

    pub async fn migrate(&self) -> Result<()> {
        Migrator::up(&self.conn, None).await?;
        Ok(())
    }
}
