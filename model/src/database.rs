use crate::{DEFAULT_PROJECT_ID, IntoCondition};
use chrono::{DateTime, Utc};
#[cfg(feature = "testing")]
use proptest_derive::Arbitrary;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::Condition;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A single database living on a managed instance, identified by
/// `(instance_id, database_name)` plus a store-assigned `uid`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "database")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub uid: i64,
    pub instance_id: String,
    pub database_name: String,
    pub project_id: String,
    pub sync_state: SyncState,
    pub data_share: bool,
    pub service_name: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: DatabaseMetadata,
    pub successful_sync_time_ts: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "crate::db_schema::Entity")]
    DbSchema,
}

impl Related<crate::db_schema::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DbSchema.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Whether the last instance probe still observed the database.
#[cfg_attr(feature = "testing", derive(Arbitrary))]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sync_state")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    #[default]
    #[sea_orm(string_value = "OK")]
    Ok,
    #[sea_orm(string_value = "NOT_FOUND")]
    NotFound,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct DatabaseMetadata {
    pub last_sync_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug)]
pub struct CreateDatabase {
    pub instance_id: String,
    pub database_name: String,
    pub project_id: String,
    pub data_share: bool,
    pub service_name: String,
}

impl CreateDatabase {
    /// A database discovered by an instance probe, placed in the default
    /// project until an operator claims it.
    pub fn discovered(instance_id: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            database_name: database_name.into(),
            project_id: DEFAULT_PROJECT_ID.to_owned(),
            data_share: false,
            service_name: String::new(),
        }
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn data_share(mut self, data_share: bool) -> Self {
        self.data_share = data_share;
        self
    }

    pub fn service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }
}

impl From<CreateDatabase> for ActiveModel {
    fn from(req: CreateDatabase) -> Self {
        Self {
            uid: NotSet,
            instance_id: Set(req.instance_id),
            database_name: Set(req.database_name),
            project_id: Set(req.project_id),
            sync_state: NotSet,
            data_share: Set(req.data_share),
            service_name: Set(req.service_name),
            metadata: Set(DatabaseMetadata::default()),
            successful_sync_time_ts: NotSet,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GetDatabase {
    pub instance_id: Option<String>,
    pub database_name: Option<String>,
    pub project_id: Option<String>,
    pub sync_state: Option<SyncState>,
}

impl GetDatabase {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = Some(database_name.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_sync_state(mut self, sync_state: SyncState) -> Self {
        self.sync_state = Some(sync_state);
        self
    }
}

impl IntoCondition for GetDatabase {
    fn into_condition(self) -> Condition {
        Condition::all()
            .add_option(self.instance_id.map(|v| Column::InstanceId.eq(v)))
            .add_option(self.database_name.map(|v| Column::DatabaseName.eq(v)))
            .add_option(self.project_id.map(|v| Column::ProjectId.eq(v)))
            .add_option(self.sync_state.map(|v| Column::SyncState.eq(v)))
    }
}

/// Partial update of a database row, keyed on `(instance_id, database_name)`.
/// Only the present fields are written.
#[derive(Clone, Debug)]
pub struct UpdateDatabase {
    pub instance_id: String,
    pub database_name: String,
    pub sync_state: Option<SyncState>,
    pub successful_sync_time_ts: Option<i64>,
    pub metadata: Option<DatabaseMetadata>,
}

impl UpdateDatabase {
    pub fn new(instance_id: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            database_name: database_name.into(),
            sync_state: None,
            successful_sync_time_ts: None,
            metadata: None,
        }
    }

    pub fn sync_state(mut self, sync_state: SyncState) -> Self {
        self.sync_state = Some(sync_state);
        self
    }

    pub fn successful_sync_time_ts(mut self, ts: i64) -> Self {
        self.successful_sync_time_ts = Some(ts);
        self
    }

    pub fn metadata(mut self, metadata: DatabaseMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
