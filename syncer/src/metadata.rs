use model::db_schema::metadata::DatabaseSchemaMetadata;
use model::instance::InstanceMetadata;

/// Structural equality over instance metadata, ignoring `last_sync_time`.
pub fn equal_instance_metadata(a: &InstanceMetadata, b: &InstanceMetadata) -> bool {
    let mut a = a.clone();
    let mut b = b.clone();
    a.last_sync_time = None;
    b.last_sync_time = None;
    a == b
}

/// Structural equality over database schema metadata, ignoring the per-table
/// volatile statistics. Statistics move on every probe; only the remaining
/// fields count as schema change.
pub fn equal_database_metadata(a: &DatabaseSchemaMetadata, b: &DatabaseSchemaMetadata) -> bool {
    mask_volatile(a.clone()) == mask_volatile(b.clone())
}

fn mask_volatile(mut metadata: DatabaseSchemaMetadata) -> DatabaseSchemaMetadata {
    for schema in &mut metadata.schemas {
        for table in &mut schema.tables {
            table.row_count = 0;
            table.data_size = 0;
            table.index_size = 0;
            table.data_free = 0;
        }
    }
    metadata
}
