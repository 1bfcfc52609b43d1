//! Convergence waits bound to cluster state.
//!
//! Each wait is a predicate over a shared [`ClusterClient`] handle plus a
//! named [`WaitProfile`](crate::domain::models::WaitProfile) cadence. Errors
//! from the client go through a [`StatusCodeClassifier`], so a resource that
//! is still being created (404) counts as not-yet while a forbidden or
//! malformed request aborts the wait.

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::errors::WaitFailure;
use crate::domain::models::cluster::{
    CustomResourceRef, DeploymentStatus, PodStatus, POD_PHASE_SUCCEEDED,
};
use crate::domain::models::config::{
    WaitProfiles, PROFILE_POD_COMPLETION, PROFILE_REPLICAS, PROFILE_SCALE_DOWN,
};
use crate::domain::models::poll::Outcome;
use crate::domain::ports::ClusterClient;
use crate::services::convergence_waiter::{ConvergenceWaiter, WaitReport};
use crate::services::error_classifier::{classify_result, StatusCodeClassifier};

const TERMINAL_POD_PHASES: [&str; 2] = [POD_PHASE_SUCCEEDED, "Failed"];

/// Waits over a single, reusable cluster client handle
pub struct ClusterWaits<C: ClusterClient + ?Sized> {
    client: Arc<C>,
    namespace: String,
    profiles: WaitProfiles,
    classifier: StatusCodeClassifier,
    cancellation: Option<CancellationToken>,
}

impl<C: ClusterClient + ?Sized> ClusterWaits<C> {
    /// Create waits for `namespace` using the default profiles
    pub fn new(client: Arc<C>, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            profiles: WaitProfiles::default(),
            classifier: StatusCodeClassifier::new(),
            cancellation: None,
        }
    }

    #[must_use]
    pub fn with_profiles(mut self, profiles: WaitProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: StatusCodeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Cancel every wait started from this handle once `token` fires
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn waiter(&self, description: String, profile: &str) -> Result<ConvergenceWaiter, WaitFailure> {
        let profile = self.profiles.get(profile)?;
        let waiter = ConvergenceWaiter::from_profile(description, profile);
        Ok(match &self.cancellation {
            Some(token) => waiter.with_cancellation(token.clone()),
            None => waiter,
        })
    }

    /// Wait until pod `pod` reports `phase`.
    ///
    /// Reaching any other terminal phase aborts: a `Succeeded` or `Failed`
    /// pod never changes phase again, whatever phase was awaited.
    pub async fn wait_pod_phase(
        &self,
        pod: &str,
        phase: &str,
    ) -> Result<WaitReport<PodStatus>, WaitFailure> {
        let waiter = self.waiter(format!("pod {pod} phase {phase}"), PROFILE_POD_COMPLETION)?;
        let (client, classifier, namespace) = (&self.client, &self.classifier, self.namespace());

        waiter
            .wait(move || async move {
                classify_result(client.read_pod(namespace, pod).await, classifier, |status| {
                    let observed = status.phase.as_deref().unwrap_or("Unknown");
                    if observed == phase {
                        Outcome::Satisfied(status)
                    } else if TERMINAL_POD_PHASES.contains(&observed) {
                        Outcome::hard_error(format!("pod {pod} finished with phase {observed}"))
                    } else {
                        Outcome::waiting(format!("pod {pod} phase is {observed}"))
                    }
                })
            })
            .await
    }

    /// Wait until pod `pod` has succeeded
    pub async fn wait_pod_completion(&self, pod: &str) -> Result<WaitReport<PodStatus>, WaitFailure> {
        self.wait_pod_phase(pod, POD_PHASE_SUCCEEDED).await
    }

    /// Wait until every container of pod `pod` is terminated
    pub async fn wait_containers_terminated(
        &self,
        pod: &str,
    ) -> Result<WaitReport<PodStatus>, WaitFailure> {
        let waiter = self.waiter(
            format!("all containers of pod {pod} terminated"),
            PROFILE_POD_COMPLETION,
        )?;
        let (client, classifier, namespace) = (&self.client, &self.classifier, self.namespace());

        waiter
            .wait(move || async move {
                classify_result(client.read_pod(namespace, pod).await, classifier, |status| {
                    if status.container_statuses.is_empty() {
                        return Outcome::waiting(format!("pod {pod} reports no containers yet"));
                    }
                    let live = status.first_live_container().map(|c| c.name.clone());
                    match live {
                        Some(container) => Outcome::waiting(format!(
                            "container {container} of {pod} pod is still alive"
                        )),
                        None => Outcome::Satisfied(status),
                    }
                })
            })
            .await
    }

    /// Wait until deployment `deployment` has exactly `expected` available
    /// replicas
    pub async fn wait_deployment_replicas(
        &self,
        namespace: &str,
        deployment: &str,
        expected: u32,
    ) -> Result<WaitReport<DeploymentStatus>, WaitFailure> {
        let waiter = self.waiter(
            format!("deployment {namespace}/{deployment} to have {expected} available replicas"),
            PROFILE_REPLICAS,
        )?;
        let (client, classifier) = (&self.client, &self.classifier);

        waiter
            .wait(move || async move {
                classify_result(
                    client.read_deployment(namespace, deployment).await,
                    classifier,
                    |status| replicas_outcome(deployment, status, expected),
                )
            })
            .await
    }

    /// Wait until every desired replica of `deployment` is ready
    pub async fn wait_deployment_ready(
        &self,
        namespace: &str,
        deployment: &str,
    ) -> Result<WaitReport<DeploymentStatus>, WaitFailure> {
        let waiter = self.waiter(
            format!("deployment {namespace}/{deployment} ready"),
            PROFILE_REPLICAS,
        )?;
        let (client, classifier) = (&self.client, &self.classifier);

        waiter
            .wait(move || async move {
                classify_result(
                    client.read_deployment(namespace, deployment).await,
                    classifier,
                    |status| {
                        if status.is_ready() {
                            Outcome::Satisfied(status)
                        } else {
                            Outcome::waiting(format!(
                                "deployment '{deployment}' is not ready: {}/{} replicas are running",
                                status.ready_replicas.unwrap_or(0),
                                status.replicas.unwrap_or(0)
                            ))
                        }
                    },
                )
            })
            .await
    }

    /// Wait until the deployment backing model deployment `name` has exactly
    /// `expected` available replicas.
    ///
    /// The backing deployment name is read from the resource's
    /// `status.deployment` on every tick, so a model deployment that has not
    /// created its deployment yet is simply not ready.
    pub async fn wait_model_deployment_replicas(
        &self,
        name: &str,
        expected: u32,
    ) -> Result<WaitReport<DeploymentStatus>, WaitFailure> {
        let name = name.to_lowercase();
        let waiter = self.waiter(
            format!("model deployment {name} to have {expected} available replicas"),
            PROFILE_REPLICAS,
        )?;
        let resource = CustomResourceRef::model_deployment();
        let (client, classifier, namespace) = (&self.client, &self.classifier, self.namespace());
        let (resource, name) = (&resource, name.as_str());

        waiter
            .wait(move || async move {
                let status = client.custom_object_status(resource, namespace, name).await;
                let deployment = match classify_result(status, classifier, |status| {
                    status_field(&status, "deployment")
                        .map_or_else(
                            || Outcome::waiting(format!("model deployment {name} has no deployment yet")),
                            Outcome::Satisfied,
                        )
                }) {
                    Outcome::Satisfied(deployment) => deployment,
                    Outcome::NotYet(observation) => return Outcome::NotYet(observation),
                    Outcome::HardError(cause) => return Outcome::HardError(cause),
                };

                classify_result(
                    client.read_deployment(namespace, &deployment).await,
                    classifier,
                    |status| replicas_outcome(&deployment, status, expected),
                )
            })
            .await
    }

    /// Wait until custom resource `name` reports `status.state ==
    /// expected_state`.
    ///
    /// Reaching any state in `failure_states` aborts the wait with the
    /// observed state.
    pub async fn wait_custom_resource_state(
        &self,
        resource: &CustomResourceRef,
        name: &str,
        expected_state: &str,
        failure_states: &[&str],
    ) -> Result<WaitReport<Value>, WaitFailure> {
        let name = name.to_lowercase();
        let waiter = self.waiter(
            format!("{} {name} state {expected_state}", resource.plural),
            PROFILE_POD_COMPLETION,
        )?;
        let (client, classifier, namespace) = (&self.client, &self.classifier, self.namespace());
        let name = name.as_str();

        waiter
            .wait(move || async move {
                classify_result(
                    client.custom_object_status(resource, namespace, name).await,
                    classifier,
                    |status| match status_field(&status, "state") {
                        Some(state) if state == expected_state => Outcome::Satisfied(status),
                        Some(state) if failure_states.contains(&state.as_str()) => {
                            Outcome::hard_error(format!(
                                "{} {name} reached state {state}",
                                resource.plural
                            ))
                        }
                        Some(state) => Outcome::waiting(format!("{name} state is {state}")),
                        None => Outcome::waiting(format!("{name} has no state yet")),
                    },
                )
            })
            .await
    }

    /// Wait until no node carries the taint `taint_key=taint_value`
    pub async fn wait_nodes_scale_down(
        &self,
        taint_key: &str,
        taint_value: &str,
    ) -> Result<WaitReport, WaitFailure> {
        let waiter = self.waiter(
            format!("nodes tainted {taint_key}={taint_value} to scale down"),
            PROFILE_SCALE_DOWN,
        )?;
        let (client, classifier) = (&self.client, &self.classifier);

        let report = waiter
            .wait(move || async move {
                classify_result(client.list_nodes().await, classifier, |nodes| {
                    let tainted = nodes
                        .iter()
                        .filter(|node| node.has_taint(taint_key, taint_value))
                        .count();
                    if tainted == 0 {
                        Outcome::Satisfied(())
                    } else {
                        Outcome::waiting(format!("current node count {tainted}"))
                    }
                })
            })
            .await?;

        info!(
            taint_key,
            taint_value,
            elapsed = ?report.elapsed,
            "scaled nodes were successfully unscaled"
        );
        Ok(report)
    }
}

fn replicas_outcome(
    deployment: &str,
    status: DeploymentStatus,
    expected: u32,
) -> Outcome<DeploymentStatus> {
    let available = status.available();
    if available == expected {
        Outcome::Satisfied(status)
    } else {
        Outcome::waiting(format!(
            "deployment {deployment} has {available}/{expected} available replicas"
        ))
    }
}

fn status_field(status: &Value, field: &str) -> Option<String> {
    status
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
