use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "markers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub lat: f64,

    pub lon: f64,

    /// Free-form marker class ('enemy', 'ally', 'unit', 'target' by convention)
    pub kind: String,

    pub label: String,

    #[sea_orm(nullable)]
    pub description: Option<String>,

    /// UTC, `YYYY-MM-DD HH:MM:SS`
    pub created_at: String,

    pub created_by: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
