pub mod anomaly;
pub mod change_history;
pub mod data_classification;
pub mod database;
pub mod db_schema;
pub mod engine;
pub mod instance;
pub mod instance_user;
pub mod project;

#[cfg(feature = "testing")]
pub mod testing;

use sea_orm::Condition;

/// Trait for types that can be converted into a SeaORM Condition for filtering queries.
pub trait IntoCondition {
    fn into_condition(self) -> Condition;
}

/// Databases discovered on an instance without an explicit assignment land in
/// the default project.
pub const DEFAULT_PROJECT_ID: &str = "default";
