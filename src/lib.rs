//! kubewait - bounded convergence waits for Kubernetes test fixtures
//!
//! End-to-end tests against a cluster spend most of their time waiting:
//! for a training pod to finish, a deployment to reach its replica count,
//! a model endpoint to answer, or tainted nodes to scale away. kubewait
//! gives every such wait the same shape: a tri-state predicate polled at a
//! fixed interval for a bounded number of attempts, cancellable, with a
//! failure that names what was awaited and what was last seen.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): poll model, cluster status shapes, errors and the cluster port
//! - **Service Layer** (`services`): scheduler, waiter, error classification, cluster bindings
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, HTTP probing
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use kubewait::{ConvergenceWaiter, Outcome};
//!
//! # async fn example() -> Result<(), kubewait::WaitFailure> {
//! let report = ConvergenceWaiter::new("model to be ready")
//!     .interval(Duration::from_secs(3))
//!     .max_attempts(6)
//!     .wait(|| async { Outcome::Satisfied(42) })
//!     .await?;
//! assert_eq!(report.value, 42);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AttemptRecord, AttemptStatus, Config, CustomResourceRef, DeploymentStatus, NodeInfo, Outcome,
    PodStatus, PollReport, PollSpec, Verdict, WaitProfile,
};
pub use domain::ports::{ClusterClient, ClusterError};
pub use domain::{ConfigurationError, WaitFailure};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::http::HttpProbe;
pub use services::{
    wait_for, ClusterWaits, ConvergenceWaiter, ErrorClass, ErrorClassifier, PollScheduler,
    StatusCodeClassifier, WaitReport,
};
