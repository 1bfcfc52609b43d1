//! Command-line interface

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use output::ErrorOutput;

/// Print a failed command's error and exit with status 1
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    let out = ErrorOutput {
        error: err.to_string(),
        causes: err.chain().skip(1).map(ToString::to_string).collect(),
    };
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        eprintln!("Error: {}", out.error);
        for cause in &out.causes {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1)
}
