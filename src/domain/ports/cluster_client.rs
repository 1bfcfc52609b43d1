use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::cluster::{
    CustomResourceRef, DeploymentStatus, NodeInfo, PodStatus,
};

/// Errors returned by a [`ClusterClient`]
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterError {
    /// The API server answered with a non-success status (e.g. `404 Not Found`)
    #[error("{status} {message}")]
    Api { status: u16, message: String },

    /// The request never got an answer (connection refused, reset, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The answer could not be decoded into the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ClusterError {
    /// Convenience constructor for API status errors
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::api(404, "Not Found")
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

/// Read-only view of a Kubernetes cluster used by the wait bindings.
///
/// Implementations own their connection and authentication; a single
/// handle is built once by the caller and shared by every wait. Each call
/// is expected to bound its own duration, the waiter never preempts a hung
/// call.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Read a pod's phase and container states
    async fn read_pod(&self, namespace: &str, name: &str) -> Result<PodStatus, ClusterError>;

    /// Read a deployment's replica counters
    async fn read_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<DeploymentStatus, ClusterError>;

    /// Read the `status` object of a namespaced custom resource.
    ///
    /// A resource without a status yields an empty JSON object.
    async fn custom_object_status(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
    ) -> Result<serde_json::Value, ClusterError>;

    /// List all nodes with their taints
    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, ClusterError>;
}
