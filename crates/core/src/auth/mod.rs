//! Authentication primitives for admin accounts.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
