//! Cluster state snapshots read by the wait bindings.
//!
//! These are deliberately narrow: only the fields the convergence
//! predicates compare against.

use serde::{Deserialize, Serialize};

/// Pod phase reported once every container exited successfully
pub const POD_PHASE_SUCCEEDED: &str = "Succeeded";

/// Snapshot of a pod's status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStatus {
    pub name: String,
    /// Pod phase (`Pending`, `Running`, `Succeeded`, `Failed`, `Unknown`)
    pub phase: Option<String>,
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    pub terminated: bool,
}

impl PodStatus {
    /// First container that has not terminated yet
    pub fn first_live_container(&self) -> Option<&ContainerStatus> {
        self.container_statuses.iter().find(|c| !c.terminated)
    }
}

/// Replica counters of a deployment. Missing counters are reported by the
/// API server as absent, not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub replicas: Option<u32>,
    pub ready_replicas: Option<u32>,
    pub available_replicas: Option<u32>,
}

impl DeploymentStatus {
    pub fn available(&self) -> u32 {
        self.available_replicas.unwrap_or(0)
    }

    /// All desired replicas are ready
    pub fn is_ready(&self) -> bool {
        self.replicas.unwrap_or(0) == self.ready_replicas.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    pub value: Option<String>,
    pub effect: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    #[serde(default)]
    pub taints: Vec<Taint>,
}

impl NodeInfo {
    /// Whether this node carries a taint with the given key and value
    pub fn has_taint(&self, key: &str, value: &str) -> bool {
        self.taints
            .iter()
            .any(|t| t.key == key && t.value.as_deref() == Some(value))
    }
}

/// Group/version/plural triple addressing a custom resource kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomResourceRef {
    pub group: String,
    pub version: String,
    pub plural: String,
}

const ODAHU_GROUP: &str = "odahuflow.odahu.org";
const ODAHU_VERSION: &str = "v1alpha1";

impl CustomResourceRef {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            plural: plural.into(),
        }
    }

    pub fn model_training() -> Self {
        Self::new(ODAHU_GROUP, ODAHU_VERSION, "modeltrainings")
    }

    pub fn model_deployment() -> Self {
        Self::new(ODAHU_GROUP, ODAHU_VERSION, "modeldeployments")
    }
}

impl std::fmt::Display for CustomResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}/{}", self.plural, self.group, self.version)
    }
}
