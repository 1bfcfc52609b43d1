//! CLI command implementations.

pub mod probe;
pub mod profiles;
