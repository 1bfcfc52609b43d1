//! Infrastructure layer module
//!
//! This module contains the adapters that touch the outside world:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - HTTP readiness probing (reqwest)

pub mod config;
pub mod http;
pub mod logging;
