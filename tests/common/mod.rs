//! Common test utilities for integration tests
//!
//! Provides an in-memory [`ClusterClient`] with scripted answers and the
//! shared logging setup used across integration test files.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use kubewait::domain::models::{
    ContainerStatus, CustomResourceRef, DeploymentStatus, NodeInfo, PodStatus, Taint,
};
use kubewait::domain::ports::{ClusterClient, ClusterError};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Answers handed out one per call; the last one repeats forever
struct Script<T> {
    answers: VecDeque<Result<T, ClusterError>>,
}

impl<T: Clone> Script<T> {
    fn next(&mut self) -> Result<T, ClusterError> {
        if self.answers.len() > 1 {
            self.answers.pop_front().unwrap_or_else(|| Err(ClusterError::not_found()))
        } else {
            self.answers
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ClusterError::not_found()))
        }
    }
}

fn scripted<T: Clone>(
    scripts: &Mutex<HashMap<String, Script<T>>>,
    key: &str,
) -> Result<T, ClusterError> {
    scripts
        .lock()
        .unwrap()
        .get_mut(key)
        .map_or_else(|| Err(ClusterError::not_found()), Script::next)
}

/// In-memory cluster whose answers are scripted per object.
///
/// Objects without a script answer `404 Not Found`.
#[derive(Default)]
pub struct FakeCluster {
    pods: Mutex<HashMap<String, Script<PodStatus>>>,
    deployments: Mutex<HashMap<String, Script<DeploymentStatus>>>,
    custom_objects: Mutex<HashMap<String, Script<Value>>>,
    nodes: Mutex<HashMap<String, Script<Vec<NodeInfo>>>>,
    calls: AtomicU32,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_pod(
        &self,
        namespace: &str,
        name: &str,
        answers: Vec<Result<PodStatus, ClusterError>>,
    ) {
        self.pods.lock().unwrap().insert(
            format!("{namespace}/{name}"),
            Script {
                answers: answers.into(),
            },
        );
    }

    pub fn script_deployment(
        &self,
        namespace: &str,
        name: &str,
        answers: Vec<Result<DeploymentStatus, ClusterError>>,
    ) {
        self.deployments.lock().unwrap().insert(
            format!("{namespace}/{name}"),
            Script {
                answers: answers.into(),
            },
        );
    }

    pub fn script_custom_object(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
        answers: Vec<Result<Value, ClusterError>>,
    ) {
        self.custom_objects.lock().unwrap().insert(
            format!("{resource}/{namespace}/{name}"),
            Script {
                answers: answers.into(),
            },
        );
    }

    pub fn script_nodes(&self, answers: Vec<Result<Vec<NodeInfo>, ClusterError>>) {
        self.nodes.lock().unwrap().insert(
            String::new(),
            Script {
                answers: answers.into(),
            },
        );
    }

    /// Total number of client calls served
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn read_pod(&self, namespace: &str, name: &str) -> Result<PodStatus, ClusterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        scripted(&self.pods, &format!("{namespace}/{name}"))
    }

    async fn read_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<DeploymentStatus, ClusterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        scripted(&self.deployments, &format!("{namespace}/{name}"))
    }

    async fn custom_object_status(
        &self,
        resource: &CustomResourceRef,
        namespace: &str,
        name: &str,
    ) -> Result<Value, ClusterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        scripted(&self.custom_objects, &format!("{resource}/{namespace}/{name}"))
    }

    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, ClusterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        scripted(&self.nodes, "")
    }
}

pub fn pod(name: &str, phase: &str) -> PodStatus {
    PodStatus {
        name: name.to_string(),
        phase: Some(phase.to_string()),
        container_statuses: Vec::new(),
    }
}

pub fn pod_with_containers(name: &str, containers: &[(&str, bool)]) -> PodStatus {
    PodStatus {
        name: name.to_string(),
        phase: Some("Running".to_string()),
        container_statuses: containers
            .iter()
            .map(|(container, terminated)| ContainerStatus {
                name: (*container).to_string(),
                terminated: *terminated,
            })
            .collect(),
    }
}

pub fn deployment(replicas: u32, available: u32) -> DeploymentStatus {
    DeploymentStatus {
        replicas: Some(replicas),
        ready_replicas: Some(available),
        available_replicas: Some(available),
    }
}

pub fn node(name: &str, taints: &[(&str, &str)]) -> NodeInfo {
    NodeInfo {
        name: name.to_string(),
        taints: taints
            .iter()
            .map(|(key, value)| Taint {
                key: (*key).to_string(),
                value: Some((*value).to_string()),
                effect: "NoSchedule".to_string(),
            })
            .collect(),
    }
}
