//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Role-driven server probing with a server x test result matrix
#[derive(Parser, Debug)]
#[command(name = "probe-matrix")]
#[command(version = "0.1.0")]
#[command(about = "Probe servers over role-bound connections and tabulate check results")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory to search for project files (repeatable; falls back to
    /// $PROBE_MATRIX_PATH, then ./projects)
    #[arg(short = 'c', long = "config-dir", global = true)]
    pub config_dirs: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a probe run for a project
    Run(RunArgs),

    /// List projects on the search path
    List(ListArgs),

    /// Show a project's structure
    Show(ShowArgs),

    /// Write an example project file
    Init(InitArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Project id, or path to a project file
    pub project: String,

    /// Output format (table, json, json-pretty, csv)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save rendered output to a file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Disable colored table output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show project file paths
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Project id, or path to a project file
    pub project: String,

    /// Output format (yaml, json)
    #[arg(short, long, default_value = "yaml")]
    pub format: String,
}

/// Arguments for init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the example project
    #[arg(short, long, default_value = "./projects/example.yaml")]
    pub output: String,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}
