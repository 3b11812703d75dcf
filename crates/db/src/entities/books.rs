//! `SeaORM` Entity for the books table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BookStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    /// Object key of the stored cover image, if any.
    pub cover: Option<String>,
    pub description: Option<String>,
    /// Count of copies currently on the shelf. Never negative.
    pub stock: i32,
    /// Derived availability; rewritten together with `stock` on every
    /// circulation transaction.
    pub status: BookStatus,
    pub added_by: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::borrowings::Entity")]
    Borrowings,
}

impl Related<super::borrowings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Borrowings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
