//! Test fixtures and proptest strategies for model types.
//!
//! This module is only available when the `testing` feature is enabled.

use crate::database::{self, DatabaseMetadata, SyncState};
use crate::engine::Engine;
use crate::instance::{self, InstanceMetadata, InstanceOptions, SyncDuration};
use crate::{DEFAULT_PROJECT_ID, instance_user::UpsertInstanceUser};
use proptest::prelude::*;

/// An in-memory instance row for unit tests that do not touch the store.
pub fn instance_fixture(resource_id: &str, engine: Engine) -> instance::Model {
    instance::Model {
        uid: 1,
        resource_id: resource_id.to_owned(),
        activation: true,
        engine,
        engine_version: String::new(),
        options: InstanceOptions {
            sync_interval: Some(SyncDuration::from_secs(300)),
        },
        metadata: InstanceMetadata::default(),
    }
}

/// An in-memory database row belonging to `instance_fixture`.
pub fn database_fixture(instance_id: &str, database_name: &str) -> database::Model {
    database::Model {
        uid: 1,
        instance_id: instance_id.to_owned(),
        database_name: database_name.to_owned(),
        project_id: DEFAULT_PROJECT_ID.to_owned(),
        sync_state: SyncState::Ok,
        data_share: false,
        service_name: String::new(),
        metadata: DatabaseMetadata::default(),
        successful_sync_time_ts: None,
    }
}

pub fn role_fixture(name: &str) -> UpsertInstanceUser {
    UpsertInstanceUser {
        name: name.to_owned(),
        grant: format!("GRANT ALL ON *.* TO '{name}'"),
    }
}

pub fn arb_resource_id() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9-]{2,29}").unwrap()
}

/// Sync durations including invalid ones (negative components, out-of-range
/// nanos), so interval-policy tests can exercise the rejection paths.
pub fn arb_sync_duration() -> impl Strategy<Value = SyncDuration> {
    (-100i64..=86_400, -5i32..2_000_000_000)
        .prop_map(|(seconds, nanos)| SyncDuration { seconds, nanos })
}

prop_compose! {
    /// Strategy for generating CreateInstance requests.
    pub fn arb_create_instance()(
        resource_id in arb_resource_id(),
        engine in any::<Engine>(),
        activation in any::<bool>(),
        interval in proptest::option::of(arb_sync_duration()),
    ) -> instance::CreateInstance {
        let mut req = instance::CreateInstance::new(resource_id, engine).activation(activation);
        if let Some(interval) = interval {
            req = req.sync_interval(interval);
        }
        req
    }
}
