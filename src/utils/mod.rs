//! Shared utilities: error type and request validation.

pub mod errors;
pub mod validation;
