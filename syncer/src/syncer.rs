use crate::anomaly::AnomalyReporter;
use crate::classification;
use crate::driver::{AdminSession, DriverFactory};
use crate::errors::SyncError;
use crate::interval;
use crate::license::{Feature, LicenseService};
use crate::metadata::equal_database_metadata;
use crate::pool::BoundedPool;
use crate::profile::Profile;
use catalog::Catalog;
use chrono::Utc;
use dashmap::DashMap;
use model::database::{self, CreateDatabase, DatabaseMetadata, GetDatabase, SyncState, UpdateDatabase};
use model::instance::{self, GetInstance, InstanceMetadata, UpdateInstance};
use model::instance_user::UpsertInstanceUser;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, error, info, info_span};

/// The schema sync runner: periodically probes every eligible instance,
/// re-reads the schema of every eligible database, and keeps snapshots and
/// anomalies in line with what the fleet actually looks like.
pub struct Syncer {
    catalog: Arc<Catalog>,
    driver_factory: Arc<dyn DriverFactory>,
    license: Arc<dyn LicenseService>,
    profile: Profile,
    reporter: AnomalyReporter,
    /// Coalescing queue of databases awaiting a sync, keyed on database UID.
    /// Re-enqueueing an already pending database overwrites its entry, so at
    /// most one sync per database is dispatched per drain.
    pending_databases: DashMap<i64, database::Model>,
}

impl Syncer {
    pub fn new(
        catalog: Arc<Catalog>,
        driver_factory: Arc<dyn DriverFactory>,
        license: Arc<dyn LicenseService>,
        profile: Profile,
    ) -> Arc<Self> {
        Arc::new(Self {
            reporter: AnomalyReporter::new(catalog.clone()),
            catalog,
            driver_factory,
            license,
            profile,
            pending_databases: DashMap::new(),
        })
    }

    /// Run both periodic loops until `shutdown` fires. In-flight workers
    /// finish their current task; nothing new is dispatched afterwards.
    pub async fn run(self: Arc<Self>, shutdown: watch::Receiver<()>) {
        info!(
            instance_tick = ?self.profile.instance_sync_interval,
            database_tick = ?self.profile.database_sync_checker_interval,
            "Starting"
        );
        let instance_loop = tokio::spawn(
            self.clone()
                .instance_tick_loop(shutdown.clone())
                .instrument(info_span!("instance_sync")),
        );
        let database_loop = tokio::spawn(
            self.clone()
                .database_tick_loop(shutdown)
                .instrument(info_span!("database_sync")),
        );
        let _ = tokio::join!(instance_loop, database_loop);
    }

    async fn instance_tick_loop(self: Arc<Self>, mut shutdown: watch::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.profile.instance_sync_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The interval yields immediately once; the first real tick comes one
        // period later.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let syncer = self.clone();
                    // Recovery boundary: a panicking fleet scan must not take
                    // the loop down with it.
                    if let Err(err) = tokio::spawn(async move { syncer.try_sync_all().await }).await {
                        if err.is_panic() {
                            error!(error = %err, "instance syncer panicked, resuming on next tick");
                        }
                    }
                }
                _ = shutdown.changed() => return,
            }
        }
    }

    async fn database_tick_loop(self: Arc<Self>, mut shutdown: watch::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.profile.database_sync_checker_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.clone().drain_pending_databases().await,
                _ = shutdown.changed() => return,
            }
        }
    }

    /// One pass of the instance tick: sync every due instance on a bounded
    /// pool, then walk all databases and enqueue the due ones.
    async fn try_sync_all(self: Arc<Self>) {
        let instances = match self.catalog.instance.get_instances(GetInstance::all()).await {
            Ok(instances) => instances,
            Err(err) => {
                error!(error = %err, "failed to retrieve instances");
                return;
            }
        };

        let now = Utc::now();
        let mut pool = BoundedPool::new(self.profile.maximum_outstanding);
        for instance in &instances {
            if !interval::sync_due(instance, instance.metadata.last_sync_time, now) {
                continue;
            }
            let syncer = self.clone();
            let instance = instance.clone();
            pool.spawn(async move {
                debug!(instance = %instance.resource_id, "syncing instance");
                if let Err(err) = syncer.sync_instance(&instance).await {
                    debug!(
                        instance = %instance.resource_id,
                        error = %err,
                        "failed to sync instance"
                    );
                }
            })
            .await;
        }
        pool.wait().await;

        let instances_by_id: HashMap<&str, &instance::Model> = instances
            .iter()
            .map(|instance| (instance.resource_id.as_str(), instance))
            .collect();

        let databases = match self.catalog.database.get_databases(GetDatabase::all()).await {
            Ok(databases) => databases,
            Err(err) => {
                error!(error = %err, "failed to retrieve databases");
                return;
            }
        };
        for database in databases {
            if database.sync_state != SyncState::Ok {
                continue;
            }
            // Tolerate dangling instance references by skipping.
            let Some(instance) = instances_by_id.get(database.instance_id.as_str()) else {
                continue;
            };
            // The database inherits the sync interval from its instance but
            // keeps its own last-sync clock.
            if !interval::sync_due(instance, database.metadata.last_sync_time, now) {
                continue;
            }
            self.pending_databases.insert(database.uid, database);
        }
    }

    /// Drain the coalescing queue onto a fresh bounded pool and wait for it.
    async fn drain_pending_databases(self: Arc<Self>) {
        let pending: Vec<i64> = self
            .pending_databases
            .iter()
            .map(|entry| *entry.key())
            .collect();
        if pending.is_empty() {
            return;
        }

        let mut pool = BoundedPool::new(self.profile.maximum_outstanding);
        for uid in pending {
            let Some((_, database)) = self.pending_databases.remove(&uid) else {
                continue;
            };
            let syncer = self.clone();
            pool.spawn(async move {
                debug!(
                    instance = %database.instance_id,
                    database = %database.database_name,
                    "syncing database schema"
                );
                if let Err(err) = syncer.sync_database_schema(&database, false).await {
                    debug!(
                        instance = %database.instance_id,
                        database = %database.database_name,
                        error = %err,
                        "failed to sync database schema"
                    );
                }
            })
            .await;
        }
        pool.wait().await;
    }

    /// UIDs currently waiting in the coalescing queue.
    #[cfg(any(test, feature = "testing"))]
    pub fn pending_database_uids(&self) -> Vec<i64> {
        self.pending_databases
            .iter()
            .map(|entry| *entry.key())
            .collect()
    }

    /// Enqueue every healthy database (optionally restricted to one
    /// instance) for a sync on the next database tick.
    pub async fn sync_all_databases(&self, instance: Option<&instance::Model>) {
        let mut find = GetDatabase::all();
        if let Some(instance) = instance {
            find = find.with_instance_id(&instance.resource_id);
        }
        let databases = match self.catalog.database.get_databases(find).await {
            Ok(databases) => databases,
            Err(err) => {
                debug!(error = %err, "failed to find databases to sync");
                return;
            }
        };
        for database in databases {
            if database.sync_state != SyncState::Ok {
                continue;
            }
            self.pending_databases.insert(database.uid, database);
        }
    }

    /// One pass over one instance: probe it, refresh the instance row and
    /// its role set, and reconcile the database list against the probe.
    pub async fn sync_instance(
        &self,
        instance: &instance::Model,
    ) -> Result<Option<instance::Model>, SyncError> {
        if self.profile.readonly {
            return Ok(None);
        }

        let driver = match self.driver_factory.open_admin(instance, None).await {
            Ok(driver) => {
                self.reporter.report_instance_connection(instance, None).await;
                driver
            }
            Err(err) => {
                self.reporter
                    .report_instance_connection(instance, Some(&err))
                    .await;
                return Err(SyncError::InstanceConnection {
                    instance: instance.resource_id.clone(),
                    source: err,
                });
            }
        };

        let mut session = AdminSession::new(driver, self.profile.sync_timeout);
        let result = self.sync_instance_with(&mut session, instance).await;
        session.close().await;
        result
    }

    async fn sync_instance_with(
        &self,
        session: &mut AdminSession,
        instance: &instance::Model,
    ) -> Result<Option<instance::Model>, SyncError> {
        let probe = session
            .sync_instance()
            .await
            .map_err(|source| SyncError::SyncInstance {
                instance: instance.resource_id.clone(),
                source,
            })?;

        // The probed engine fields are written unconditionally; the stored
        // metadata only serves as the comparison base for fields that must
        // not move on volatile-only change.
        let mut update = UpdateInstance::new(
            &instance.resource_id,
            InstanceMetadata {
                last_sync_time: Some(Utc::now()),
                mysql_lower_case_table_names: probe.metadata.mysql_lower_case_table_names,
            },
        );
        if probe.version != instance.engine_version {
            update = update.engine_version(&probe.version);
        }
        let updated = self.catalog.instance.update_instance(update).await?;

        let users: Vec<UpsertInstanceUser> = probe
            .instance_roles
            .iter()
            .map(|role| UpsertInstanceUser {
                name: role.name.clone(),
                grant: role.grant.clone(),
            })
            .collect();
        self.catalog
            .instance
            .replace_instance_users(updated.uid, users)
            .await?;

        let databases = self
            .catalog
            .database
            .get_databases(GetDatabase::all().with_instance_id(&instance.resource_id))
            .await?;

        // Names present in the probe but absent locally get a row in the
        // default project.
        for probed in &probe.databases {
            if databases
                .iter()
                .any(|database| database.database_name == probed.name)
            {
                continue;
            }
            self.catalog
                .database
                .create_database(
                    CreateDatabase::discovered(&instance.resource_id, &probed.name)
                        .data_share(probed.datashare)
                        .service_name(&probed.service_name),
                )
                .await?;
        }

        // Local rows the probe no longer reports flip to NotFound; rows are
        // never deleted here.
        for database in &databases {
            if probe
                .databases
                .iter()
                .any(|probed| probed.name == database.database_name)
            {
                continue;
            }
            self.catalog
                .database
                .update_database(
                    UpdateDatabase::new(&database.instance_id, &database.database_name)
                        .sync_state(SyncState::NotFound),
                )
                .await?;
        }

        Ok(Some(updated))
    }

    /// One pass over one database: re-read its schema, refresh the snapshot
    /// according to the dump policy, and run the drift check.
    pub async fn sync_database_schema(
        &self,
        database: &database::Model,
        force: bool,
    ) -> Result<(), SyncError> {
        if self.profile.readonly {
            return Ok(());
        }

        let instance = self
            .catalog
            .instance
            .find_instance(&database.instance_id)
            .await?
            .ok_or_else(|| SyncError::InstanceNotFound(database.instance_id.clone()))?;

        let driver = match self.driver_factory.open_admin(&instance, Some(database)).await {
            Ok(driver) => {
                self.reporter
                    .report_database_connection(&instance, database, None)
                    .await;
                driver
            }
            Err(err) => {
                self.reporter
                    .report_database_connection(&instance, database, Some(&err))
                    .await;
                return Err(SyncError::DatabaseConnection {
                    instance: instance.resource_id.clone(),
                    database: database.database_name.clone(),
                    source: err,
                });
            }
        };

        let mut session = AdminSession::new(driver, self.profile.sync_timeout);
        let result = self
            .sync_database_schema_with(&mut session, &instance, database, force)
            .await;
        session.close().await;
        result
    }

    async fn sync_database_schema_with(
        &self,
        session: &mut AdminSession,
        instance: &instance::Model,
        database: &database::Model,
        force: bool,
    ) -> Result<(), SyncError> {
        let mut live_metadata =
            session
                .sync_db_schema()
                .await
                .map_err(|source| SyncError::SyncSchema {
                    database: database.database_name.clone(),
                    source,
                })?;

        let stored = self.catalog.schema.get_schema(database.uid).await?;
        let mut config = stored
            .as_ref()
            .map(|schema| schema.config.clone())
            .unwrap_or_default();

        if self
            .classification_from_config(instance, database)
            .await?
        {
            classification::set_user_comment_from_comment(&mut live_metadata);
        } else {
            classification::set_classification_and_user_comment_from_comment(
                &mut live_metadata,
                &mut config,
            );
        }

        let now = Utc::now();
        self.catalog
            .database
            .update_database(
                UpdateDatabase::new(&database.instance_id, &database.database_name)
                    .sync_state(SyncState::Ok)
                    .successful_sync_time_ts(now.timestamp())
                    .metadata(DatabaseMetadata {
                        last_sync_time: Some(now),
                    }),
            )
            .await?;

        let old_metadata = stored.as_ref().map(|schema| &schema.metadata);
        let mut raw_dump = stored
            .as_ref()
            .map(|schema| schema.raw_dump.clone())
            .unwrap_or_default();

        let full_equal = old_metadata.is_some_and(|old| *old == live_metadata);
        if force || !full_equal {
            let substantive_equal =
                old_metadata.is_some_and(|old| equal_database_metadata(old, &live_metadata));
            if force || !substantive_equal {
                // Dumping is expensive; volatile-stat deltas reuse the stored
                // dump and only real structural drift regenerates it.
                let mut dump = String::new();
                session
                    .dump(&mut dump)
                    .await
                    .map_err(|source| SyncError::Dump {
                        database: database.database_name.clone(),
                        source,
                    })?;
                raw_dump = dump;
            }

            if let Err(err) = self
                .catalog
                .schema
                .upsert_schema(database.uid, &live_metadata, &raw_dump, &config)
                .await
            {
                if err.to_string().contains("escape sequence") {
                    match serde_json::to_string(&live_metadata) {
                        Ok(metadata_json) => error!(
                            metadata = %metadata_json,
                            raw_dump = %raw_dump,
                            "unsupported escape sequence in schema snapshot"
                        ),
                        Err(marshal_err) => error!(
                            error = %marshal_err,
                            "failed to serialize metadata for the escape sequence postmortem"
                        ),
                    }
                }
                return Err(err.into());
            }
        }

        self.check_schema_drift(instance, database, &raw_dump).await;
        Ok(())
    }

    /// Resolve the effective classification mode for a database. Engines
    /// other than MySQL and PostgreSQL are forced to config-sourced
    /// classification regardless of the project setting.
    async fn classification_from_config(
        &self,
        instance: &instance::Model,
        database: &database::Model,
    ) -> Result<bool, SyncError> {
        let project = self.catalog.project.find_project(&database.project_id).await?;
        let config_id = project
            .map(|project| project.data_classification_config_id)
            .unwrap_or_default();
        let from_config = self
            .catalog
            .project
            .find_classification_config(&config_id)
            .await?
            .map(|config| config.classification_from_config)
            .unwrap_or(false);
        if !instance.engine.supports_comment_classification() {
            return Ok(true);
        }
        Ok(from_config)
    }

    /// Compare the latest applied revision with the current dump and keep
    /// the drift anomaly in line. Failures here are logged, never returned:
    /// drift bookkeeping must not fail the sync.
    async fn check_schema_drift(
        &self,
        instance: &instance::Model,
        database: &database::Model,
        raw_dump: &str,
    ) {
        if self
            .license
            .is_feature_enabled_for_instance(Feature::SchemaDrift, instance)
            .is_err()
        {
            return;
        }
        if instance.engine.schema_drift_exempt() {
            return;
        }

        let latest = match self
            .catalog
            .change_history
            .find_latest(instance.uid, database.uid)
            .await
        {
            Ok(latest) => latest,
            Err(err) => {
                error!(
                    instance = %instance.resource_id,
                    database = %database.database_name,
                    error = %err,
                    "failed to check schema drift"
                );
                return;
            }
        };
        let Some(history) = latest else {
            return;
        };
        self.reporter
            .report_schema_drift(instance, database, &history.version, &history.schema, raw_dump)
            .await;
    }
}
