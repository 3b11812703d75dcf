//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use biblio_core::circulation::Availability;

/// Availability status of a book, as stored in the `book_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "book_status")]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    /// At least one copy is on the shelf.
    #[sea_orm(string_value = "available")]
    Available,
    /// No copy is currently loanable.
    #[sea_orm(string_value = "borrowed")]
    Borrowed,
}

impl From<Availability> for BookStatus {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Available => Self::Available,
            Availability::Borrowed => Self::Borrowed,
        }
    }
}

impl From<BookStatus> for Availability {
    fn from(value: BookStatus) -> Self {
        match value {
            BookStatus::Available => Self::Available,
            BookStatus::Borrowed => Self::Borrowed,
        }
    }
}
