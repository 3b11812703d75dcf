//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod admin;
pub mod book;
pub mod borrowing;
pub mod circulation;

pub use admin::AdminRepository;
pub use book::{BookError, BookRepository, CreateBookInput, UpdateBookInput};
pub use borrowing::{BorrowerInput, BorrowingRepository};
pub use circulation::{
    BorrowOutcome, BorrowRequest, CirculationError, CirculationRepository,
};
