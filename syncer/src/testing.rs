//! Scripted driver, factory and license fakes for tests.
//!
//! This module is only available in tests or with the `testing` feature.

use crate::driver::{
    DatabaseProbe, Driver, DriverError, DriverFactory, InstanceProbe, InstanceRole,
};
use crate::license::{Feature, FeatureNotAvailable, LicenseService};
use async_trait::async_trait;
use dashmap::DashMap;
use model::db_schema::metadata::DatabaseSchemaMetadata;
use model::{database, instance};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared script for one instance: what probes, schema reads and dumps
/// return, plus counters observing what the syncer actually asked for.
#[derive(Clone, Default)]
pub struct ScriptedInstance {
    state: Arc<Mutex<ScriptedState>>,
    pub sync_instance_calls: Arc<AtomicUsize>,
    pub sync_schema_calls: Arc<AtomicUsize>,
    pub dump_calls: Arc<AtomicUsize>,
    pub open_sessions: Arc<AtomicUsize>,
    pub peak_sessions: Arc<AtomicUsize>,
}

#[derive(Default)]
struct ScriptedState {
    probe: InstanceProbe,
    schema: DatabaseSchemaMetadata,
    dump: String,
    connect_error: Option<String>,
    call_delay: Option<Duration>,
}

impl ScriptedInstance {
    pub fn set_probe(&self, probe: InstanceProbe) {
        self.state.lock().unwrap().probe = probe;
    }

    pub fn set_schema(&self, schema: DatabaseSchemaMetadata) {
        self.state.lock().unwrap().schema = schema;
    }

    pub fn set_dump(&self, dump: &str) {
        self.state.lock().unwrap().dump = dump.to_owned();
    }

    /// Make every subsequent `open_admin` fail with a connect error.
    pub fn fail_connections(&self, detail: &str) {
        self.state.lock().unwrap().connect_error = Some(detail.to_owned());
    }

    pub fn restore_connections(&self) {
        self.state.lock().unwrap().connect_error = None;
    }

    /// Slow every driver call down, for deadline and concurrency tests.
    pub fn delay_calls(&self, delay: Duration) {
        self.state.lock().unwrap().call_delay = Some(delay);
    }

    pub fn driver(&self) -> ScriptedDriver {
        let now = self.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_sessions.fetch_max(now, Ordering::SeqCst);
        ScriptedDriver {
            script: self.clone(),
        }
    }

    async fn pace(&self) {
        let delay = self.state.lock().unwrap().call_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

pub struct ScriptedDriver {
    script: ScriptedInstance,
}

#[async_trait]
impl Driver for ScriptedDriver {
    async fn sync_instance(&mut self) -> Result<InstanceProbe, DriverError> {
        self.script.pace().await;
        self.script.sync_instance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.state.lock().unwrap().probe.clone())
    }

    async fn sync_db_schema(&mut self) -> Result<DatabaseSchemaMetadata, DriverError> {
        self.script.pace().await;
        self.script.sync_schema_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.state.lock().unwrap().schema.clone())
    }

    async fn dump(&mut self, out: &mut String) -> Result<(), DriverError> {
        self.script.pace().await;
        self.script.dump_calls.fetch_add(1, Ordering::SeqCst);
        out.push_str(&self.script.state.lock().unwrap().dump);
        Ok(())
    }

    async fn close(&mut self) {
        self.script.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Factory handing out scripted drivers per instance resource id. Instances
/// without a script refuse connections.
#[derive(Default)]
pub struct ScriptedDriverFactory {
    instances: DashMap<String, ScriptedInstance>,
}

impl ScriptedDriverFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The script for `resource_id`, created on first use.
    pub fn script(&self, resource_id: &str) -> ScriptedInstance {
        self.instances
            .entry(resource_id.to_owned())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl DriverFactory for ScriptedDriverFactory {
    async fn open_admin(
        &self,
        instance: &instance::Model,
        _database: Option<&database::Model>,
    ) -> Result<Box<dyn Driver>, DriverError> {
        let Some(script) = self
            .instances
            .get(&instance.resource_id)
            .map(|entry| entry.value().clone())
        else {
            return Err(DriverError::Connect(format!(
                "no route to instance {}",
                instance.resource_id
            )));
        };
        if let Some(detail) = script.state.lock().unwrap().connect_error.clone() {
            return Err(DriverError::Connect(detail));
        }
        Ok(Box::new(script.driver()))
    }
}

/// License gate with every feature enabled.
pub struct AllowAllLicense;

impl LicenseService for AllowAllLicense {
    fn is_feature_enabled_for_instance(
        &self,
        _feature: Feature,
        _instance: &instance::Model,
    ) -> Result<(), FeatureNotAvailable> {
        Ok(())
    }
}

/// License gate with every feature disabled.
pub struct DenyAllLicense;

impl LicenseService for DenyAllLicense {
    fn is_feature_enabled_for_instance(
        &self,
        feature: Feature,
        instance: &instance::Model,
    ) -> Result<(), FeatureNotAvailable> {
        Err(FeatureNotAvailable {
            feature,
            instance: instance.resource_id.clone(),
        })
    }
}

pub fn probe_with_databases(version: &str, names: &[&str]) -> InstanceProbe {
    InstanceProbe {
        version: version.to_owned(),
        databases: names
            .iter()
            .map(|name| DatabaseProbe {
                name: (*name).to_owned(),
                ..DatabaseProbe::default()
            })
            .collect(),
        ..InstanceProbe::default()
    }
}

pub fn role(name: &str, grant: &str) -> InstanceRole {
    InstanceRole {
        name: name.to_owned(),
        grant: grant.to_owned(),
    }
}
