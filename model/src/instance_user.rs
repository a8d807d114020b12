use sea_orm::entity::prelude::*;

/// An instance-level role observed by the last probe. The full set is
/// replaced on every successful instance sync.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "instance_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub instance_uid: i64,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub grant: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::instance::Entity",
        from = "Column::InstanceUid",
        to = "crate::instance::Column::Uid"
    )]
    Instance,
}

impl Related<crate::instance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpsertInstanceUser {
    pub name: String,
    pub grant: String,
}
