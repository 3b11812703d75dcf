//! `SeaORM` entity definitions.

pub mod admins;
pub mod books;
pub mod borrowings;
pub mod sea_orm_active_enums;
