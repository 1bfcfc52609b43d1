//! Port traits implemented outside the domain

pub mod cluster_client;

pub use cluster_client::{ClusterClient, ClusterError};
