//! Service layer
//!
//! The convergence-waiting engine and the cluster bindings built on it:
//! - [`PollScheduler`]: bounded, cancellable polling of a tri-state predicate
//! - [`ConvergenceWaiter`]: named waits with diagnosable failures
//! - [`error_classifier`]: transient vs. permanent error policy
//! - [`ClusterWaits`]: pod, deployment, custom resource and node waits

pub mod cluster_waits;
pub mod convergence_waiter;
pub mod error_classifier;
pub mod poll_scheduler;

pub use cluster_waits::ClusterWaits;
pub use convergence_waiter::{wait_for, ConvergenceWaiter, WaitReport};
pub use error_classifier::{
    classify_error, classify_result, ErrorClass, ErrorClassifier, StatusCodeClassifier, StatusCoded,
};
pub use poll_scheduler::{AttemptObserver, PollScheduler};
