//! Domain layer for kubewait
//!
//! Poll model, cluster snapshots, configuration model, and the port traits
//! that cluster access is expressed through.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConfigurationError, WaitFailure};
