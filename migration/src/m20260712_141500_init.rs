use crate::{assert_not_has_tables, drop_tables};
use model::anomaly::AnomalyType;
use model::database::SyncState;
use model::engine::Engine as EngineTag;
use sea_orm::DbBackend;
use sea_orm_migration::prelude::{Index as MigrationIndex, Table as MigrationTable, *};
use strum::IntoEnumIterator;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        assert_not_has_tables!(
            manager,
            Instance,
            Database,
            DbSchema,
            InstanceUser,
            ChangeHistory,
            Anomaly,
            Project,
            DataClassificationConfig
        );

        match manager.get_database_backend() {
            DbBackend::MySql => {}
            DbBackend::Postgres => {}
            DbBackend::Sqlite => {
                manager
                    .get_connection()
                    .execute_unprepared("PRAGMA foreign_keys = ON")
                    .await
                    .expect("failed to set foreign key enforcement");

                manager
                    .get_connection()
                    .execute_unprepared("PRAGMA journal_mode = WAL")
                    .await
                    .expect("failed to set journal mode");
            }
            _ => {}
        }

        manager
            .create_table(
                MigrationTable::create()
                    .table(Instance::Table)
                    .col(
                        ColumnDef::new(Instance::Uid)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Instance::ResourceId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Instance::Activation)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Instance::Engine)
                            .string()
                            .not_null()
                            .check(
                                Expr::col(Instance::Engine).is_in(
                                    EngineTag::iter()
                                        .map(|e| e.to_string())
                                        .collect::<Vec<_>>(),
                                ),
                            ),
                    )
                    .col(
                        ColumnDef::new(Instance::EngineVersion)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Instance::Options).json_binary().not_null())
                    .col(ColumnDef::new(Instance::Metadata).json_binary().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Database::Table)
                    .col(
                        ColumnDef::new(Database::Uid)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Database::InstanceId).string().not_null())
                    .col(ColumnDef::new(Database::DatabaseName).string().not_null())
                    .col(ColumnDef::new(Database::ProjectId).string().not_null())
                    .col(
                        ColumnDef::new(Database::SyncState)
                            .string()
                            .not_null()
                            .default(SyncState::default().to_string())
                            .check(
                                Expr::col(Database::SyncState).is_in(
                                    SyncState::iter()
                                        .map(|s| s.to_string())
                                        .collect::<Vec<_>>(),
                                ),
                            ),
                    )
                    .col(
                        ColumnDef::new(Database::DataShare)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Database::ServiceName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Database::Metadata).json_binary().not_null())
                    .col(ColumnDef::new(Database::SuccessfulSyncTimeTs).big_integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                MigrationIndex::create()
                    .name("idx_database_instance_name")
                    .table(Database::Table)
                    .col(Database::InstanceId)
                    .col(Database::DatabaseName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(DbSchema::Table)
                    .col(
                        ColumnDef::new(DbSchema::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DbSchema::DatabaseUid)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DbSchema::Metadata).json_binary().not_null())
                    .col(ColumnDef::new(DbSchema::RawDump).text().not_null())
                    .col(ColumnDef::new(DbSchema::Config).json_binary().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_db_schema_database")
                            .from(DbSchema::Table, DbSchema::DatabaseUid)
                            .to(Database::Table, Database::Uid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(InstanceUser::Table)
                    .col(
                        ColumnDef::new(InstanceUser::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InstanceUser::InstanceUid)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstanceUser::Name).string().not_null())
                    .col(ColumnDef::new(InstanceUser::Grant).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_instance_user_instance")
                            .from(InstanceUser::Table, InstanceUser::InstanceUid)
                            .to(Instance::Table, Instance::Uid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                MigrationIndex::create()
                    .name("idx_instance_user_instance_name")
                    .table(InstanceUser::Table)
                    .col(InstanceUser::InstanceUid)
                    .col(InstanceUser::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(ChangeHistory::Table)
                    .col(
                        ColumnDef::new(ChangeHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChangeHistory::InstanceUid)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChangeHistory::DatabaseUid)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChangeHistory::Version).string().not_null())
                    .col(ColumnDef::new(ChangeHistory::Schema).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                MigrationIndex::create()
                    .name("idx_change_history_database")
                    .table(ChangeHistory::Table)
                    .col(ChangeHistory::InstanceUid)
                    .col(ChangeHistory::DatabaseUid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Anomaly::Table)
                    .col(
                        ColumnDef::new(Anomaly::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Anomaly::InstanceId).string().not_null())
                    .col(ColumnDef::new(Anomaly::DatabaseUid).big_integer())
                    .col(
                        ColumnDef::new(Anomaly::AnomalyType)
                            .string()
                            .not_null()
                            .check(
                                Expr::col(Anomaly::AnomalyType).is_in(
                                    AnomalyType::iter()
                                        .map(|t| t.to_string())
                                        .collect::<Vec<_>>(),
                                ),
                            ),
                    )
                    .col(ColumnDef::new(Anomaly::Payload).text().not_null())
                    .col(
                        ColumnDef::new(Anomaly::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                MigrationIndex::create()
                    .name("idx_anomaly_subject_type")
                    .table(Anomaly::Table)
                    .col(Anomaly::InstanceId)
                    .col(Anomaly::AnomalyType)
                    .col(Anomaly::Archived)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(Project::Table)
                    .col(
                        ColumnDef::new(Project::ResourceId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Project::DataClassificationConfigId)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                MigrationTable::create()
                    .table(DataClassificationConfig::Table)
                    .col(
                        ColumnDef::new(DataClassificationConfig::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DataClassificationConfig::ClassificationFromConfig)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_tables!(
            manager,
            DataClassificationConfig,
            Project,
            Anomaly,
            ChangeHistory,
            InstanceUser,
            DbSchema,
            Database,
            Instance
        );
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Instance {
    Table,
    Uid,
    ResourceId,
    Activation,
    Engine,
    EngineVersion,
    Options,
    Metadata,
}

#[derive(DeriveIden)]
enum Database {
    Table,
    Uid,
    InstanceId,
    DatabaseName,
    ProjectId,
    SyncState,
    DataShare,
    ServiceName,
    Metadata,
    SuccessfulSyncTimeTs,
}

#[derive(DeriveIden)]
enum DbSchema {
    Table,
    Id,
    DatabaseUid,
    Metadata,
    RawDump,
    Config,
}

#[derive(DeriveIden)]
enum InstanceUser {
    Table,
    Id,
    InstanceUid,
    Name,
    Grant,
}

#[derive(DeriveIden)]
enum ChangeHistory {
    Table,
    Id,
    InstanceUid,
    DatabaseUid,
    Version,
    Schema,
}

#[derive(DeriveIden)]
enum Anomaly {
    Table,
    Id,
    InstanceId,
    DatabaseUid,
    AnomalyType,
    Payload,
    Archived,
}

#[derive(DeriveIden)]
enum Project {
    Table,
    ResourceId,
    DataClassificationConfigId,
}

#[derive(DeriveIden)]
enum DataClassificationConfig {
    Table,
    Id,
    ClassificationFromConfig,
}
