#[cfg(feature = "testing")]
use proptest_derive::Arbitrary;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Database engine of a managed instance.
///
/// The persisted string values are part of the stored format and must not
/// change.
#[cfg_attr(feature = "testing", derive(Arbitrary))]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "engine")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Engine {
    #[default]
    #[sea_orm(string_value = "MYSQL")]
    Mysql,
    #[sea_orm(string_value = "POSTGRES")]
    Postgres,
    #[sea_orm(string_value = "MONGODB")]
    Mongodb,
    #[sea_orm(string_value = "REDIS")]
    Redis,
    #[sea_orm(string_value = "ORACLE")]
    Oracle,
    #[sea_orm(string_value = "OCEANBASE_ORACLE")]
    OceanbaseOracle,
    #[sea_orm(string_value = "MSSQL")]
    Mssql,
    #[sea_orm(string_value = "REDSHIFT")]
    Redshift,
    #[sea_orm(string_value = "TIDB")]
    Tidb,
    #[sea_orm(string_value = "MARIADB")]
    Mariadb,
    #[sea_orm(string_value = "CLICKHOUSE")]
    Clickhouse,
    #[sea_orm(string_value = "SNOWFLAKE")]
    Snowflake,
}

impl Engine {
    /// Engines whose object comments can carry classification identifiers.
    /// Every other engine is forced to config-sourced classification.
    pub fn supports_comment_classification(self) -> bool {
        matches!(self, Engine::Mysql | Engine::Postgres)
    }

    /// Engines exempt from schema drift detection, either because they are
    /// schemaless or because they have no canonical textual dump to compare.
    pub fn schema_drift_exempt(self) -> bool {
        matches!(
            self,
            Engine::Mongodb
                | Engine::Redis
                | Engine::Oracle
                | Engine::OceanbaseOracle
                | Engine::Mssql
                | Engine::Redshift
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn comment_classification_is_mysql_and_postgres_only() {
        for engine in Engine::iter() {
            assert_eq!(
                engine.supports_comment_classification(),
                matches!(engine, Engine::Mysql | Engine::Postgres),
                "{engine}"
            );
        }
    }

    #[test]
    fn drift_exempt_set_matches_schemaless_engines() {
        let exempt: Vec<Engine> = Engine::iter().filter(|e| e.schema_drift_exempt()).collect();
        assert_eq!(
            exempt,
            vec![
                Engine::Mongodb,
                Engine::Redis,
                Engine::Oracle,
                Engine::OceanbaseOracle,
                Engine::Mssql,
                Engine::Redshift,
            ]
        );
    }

    #[test]
    fn stored_values_are_screaming_snake_case() {
        assert_eq!(Engine::OceanbaseOracle.to_string(), "OCEANBASE_ORACLE");
        assert_eq!(Engine::Mysql.to_string(), "MYSQL");
    }
}
