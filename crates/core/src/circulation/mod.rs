//! Availability derivation for lending and returning copies.
//!
//! The status of a book is never set directly; it is always recomputed from
//! the stock count (and, on the return path, the open-borrowing count) as a
//! side effect of a circulation transaction.

mod availability;

pub use availability::{Availability, after_borrow, after_return};
