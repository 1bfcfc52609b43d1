//! Domain models

pub mod cluster;
pub mod config;
pub mod poll;

pub use cluster::{
    ContainerStatus, CustomResourceRef, DeploymentStatus, NodeInfo, PodStatus, Taint,
    POD_PHASE_SUCCEEDED,
};
pub use config::{
    Config, LogConfig, LogFormat, RotationPolicy, WaitProfile, WaitProfiles, PROFILE_HTTP_PROBE,
    PROFILE_POD_COMPLETION, PROFILE_REPLICAS, PROFILE_SCALE_DOWN,
};
pub use poll::{
    AttemptRecord, AttemptStatus, Outcome, PollBound, PollReport, PollSpec, Verdict,
};
