//! Validation module for feeding input
//!
//! Shared by the record store and the HTTP layer.

pub mod feeding;

pub use feeding::{validate_limit, validate_new_feeding};
