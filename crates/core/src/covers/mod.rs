//! Cover image storage over object stores.
//!
//! Covers are proxied through the server: the upload handler hands the
//! image bytes to [`CoverStorage`], which writes them to the configured
//! backend and yields the object key recorded on the book row. Replaced or
//! removed covers are deleted from the store on the same code path that
//! rewrites the row.

mod error;
mod service;

pub use error::CoverError;
pub use service::CoverStorage;
