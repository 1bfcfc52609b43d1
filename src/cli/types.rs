//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::probe::ProbeArgs;

#[derive(Parser, Debug)]
#[command(name = "kubewait")]
#[command(about = "kubewait - wait for Kubernetes test fixtures to converge", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .kubewait/
    #[arg(short, long, global = true, env = "KUBEWAIT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait until an HTTP endpoint answers 200 OK
    Probe(ProbeArgs),

    /// List configured wait profiles
    Profiles,
}
