use crate::IntoCondition;
use crate::engine::Engine;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::Condition;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A managed database instance. Rows are created by provisioning flows; the
/// sync runner only ever updates `engine_version` and `metadata`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "instance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub uid: i64,
    #[sea_orm(unique)]
    pub resource_id: String,
    pub activation: bool,
    pub engine: Engine,
    pub engine_version: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub options: InstanceOptions,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: InstanceMetadata,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::instance_user::Entity")]
    InstanceUser,
}

impl Related<crate::instance_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstanceUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Operator-controlled instance options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct InstanceOptions {
    /// How often the instance and its databases are re-synced. Absent,
    /// invalid, or zero means never.
    pub sync_interval: Option<SyncDuration>,
}

/// Wire form of a duration: whole seconds plus a sub-second nanosecond part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDuration {
    pub seconds: i64,
    pub nanos: i32,
}

impl SyncDuration {
    pub fn from_secs(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub fn is_valid(&self) -> bool {
        self.seconds >= 0 && (0..1_000_000_000).contains(&self.nanos)
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Callers must check `is_valid` first; an invalid duration has no
    /// std representation.
    pub fn as_duration(&self) -> Duration {
        Duration::new(self.seconds as u64, self.nanos as u32)
    }
}

/// Engine-level metadata captured by the last instance probe.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct InstanceMetadata {
    pub last_sync_time: Option<DateTime<Utc>>,
    pub mysql_lower_case_table_names: i32,
}

#[derive(Clone, Debug)]
pub struct CreateInstance {
    pub resource_id: String,
    pub engine: Engine,
    pub engine_version: String,
    pub activation: bool,
    pub options: InstanceOptions,
}

impl CreateInstance {
    pub fn new(resource_id: impl Into<String>, engine: Engine) -> Self {
        Self {
            resource_id: resource_id.into(),
            engine,
            engine_version: String::new(),
            activation: true,
            options: InstanceOptions::default(),
        }
    }

    pub fn engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = version.into();
        self
    }

    pub fn activation(mut self, activation: bool) -> Self {
        self.activation = activation;
        self
    }

    pub fn sync_interval(mut self, interval: SyncDuration) -> Self {
        self.options.sync_interval = Some(interval);
        self
    }
}

impl From<CreateInstance> for ActiveModel {
    fn from(req: CreateInstance) -> Self {
        Self {
            uid: NotSet,
            resource_id: Set(req.resource_id),
            activation: Set(req.activation),
            engine: Set(req.engine),
            engine_version: Set(req.engine_version),
            options: Set(req.options),
            metadata: Set(InstanceMetadata::default()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GetInstance {
    pub resource_id: Option<String>,
    pub engine: Option<Engine>,
}

impl GetInstance {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = Some(engine);
        self
    }
}

impl IntoCondition for GetInstance {
    fn into_condition(self) -> Condition {
        Condition::all()
            .add_option(self.resource_id.map(|v| Column::ResourceId.eq(v)))
            .add_option(self.engine.map(|v| Column::Engine.eq(v)))
    }
}

/// Fields the sync runner writes back after probing an instance. `metadata`
/// replaces the stored document wholesale; `engine_version` only moves when
/// the probe disagrees with the stored version.
#[derive(Clone, Debug)]
pub struct UpdateInstance {
    pub resource_id: String,
    pub metadata: InstanceMetadata,
    pub engine_version: Option<String>,
}

impl UpdateInstance {
    pub fn new(resource_id: impl Into<String>, metadata: InstanceMetadata) -> Self {
        Self {
            resource_id: resource_id.into(),
            metadata,
            engine_version: None,
        }
    }

    pub fn engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = Some(version.into());
        self
    }
}
