use crate::IntoCondition;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::Condition;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A durable operational problem attached to an instance or one of its
/// databases. At most one non-archived row exists per `(subject, type)`;
/// recovery archives the row instead of deleting it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "anomaly")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub instance_id: String,
    pub database_uid: Option<i64>,
    pub anomaly_type: AnomalyType,
    #[sea_orm(column_type = "Text")]
    pub payload: String,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "anomaly_type")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    #[sea_orm(string_value = "INSTANCE_CONNECTION")]
    InstanceConnection,
    #[sea_orm(string_value = "DATABASE_CONNECTION")]
    DatabaseConnection,
    #[sea_orm(string_value = "DATABASE_SCHEMA_DRIFT")]
    DatabaseSchemaDrift,
}

/// Persisted payload of an instance connection anomaly. Field names are part
/// of the stored format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceConnectionPayload {
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseConnectionPayload {
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchemaDriftPayload {
    pub version: String,
    pub expect: String,
    pub actual: String,
}

#[derive(Clone, Debug)]
pub struct UpsertAnomaly {
    pub instance_id: String,
    pub database_uid: Option<i64>,
    pub anomaly_type: AnomalyType,
    pub payload: String,
}

impl From<UpsertAnomaly> for ActiveModel {
    fn from(req: UpsertAnomaly) -> Self {
        Self {
            id: NotSet,
            instance_id: Set(req.instance_id),
            database_uid: Set(req.database_uid),
            anomaly_type: Set(req.anomaly_type),
            payload: Set(req.payload),
            archived: Set(false),
        }
    }
}

/// Identifies the active anomaly to archive. Exactly one of the subject
/// fields is normally set: `instance_id` for instance-level anomalies,
/// `database_uid` for database-level ones.
#[derive(Clone, Debug)]
pub struct ArchiveAnomaly {
    pub instance_id: Option<String>,
    pub database_uid: Option<i64>,
    pub anomaly_type: AnomalyType,
}

impl ArchiveAnomaly {
    pub fn instance(instance_id: impl Into<String>, anomaly_type: AnomalyType) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
            database_uid: None,
            anomaly_type,
        }
    }

    pub fn database(database_uid: i64, anomaly_type: AnomalyType) -> Self {
        Self {
            instance_id: None,
            database_uid: Some(database_uid),
            anomaly_type,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GetAnomaly {
    pub instance_id: Option<String>,
    pub database_uid: Option<i64>,
    pub anomaly_type: Option<AnomalyType>,
    pub archived: Option<bool>,
}

impl GetAnomaly {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    pub fn with_database_uid(mut self, database_uid: i64) -> Self {
        self.database_uid = Some(database_uid);
        self
    }

    pub fn with_anomaly_type(mut self, anomaly_type: AnomalyType) -> Self {
        self.anomaly_type = Some(anomaly_type);
        self
    }

    pub fn active(mut self) -> Self {
        self.archived = Some(false);
        self
    }
}

impl IntoCondition for GetAnomaly {
    fn into_condition(self) -> Condition {
        Condition::all()
            .add_option(self.instance_id.map(|v| Column::InstanceId.eq(v)))
            .add_option(self.database_uid.map(|v| Column::DatabaseUid.eq(v)))
            .add_option(self.anomaly_type.map(|v| Column::AnomalyType.eq(v)))
            .add_option(self.archived.map(|v| Column::Archived.eq(v)))
    }
}
