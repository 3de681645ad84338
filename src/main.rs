//! probe-matrix - Role-driven server probing
//!
//! A CLI tool that opens one connection per (server, connection-type) pair
//! concurrently, runs every bound check against the responses produced over
//! that connection, and merges all outcomes into a single server x test
//! result matrix.
//!
//! ## Usage
//!
//! ```bash
//! # Execute a probe run
//! probe-matrix run blog
//!
//! # Machine-readable output
//! probe-matrix run blog --format json
//!
//! # List projects on the search path
//! probe-matrix list --detailed
//!
//! # Inspect a project's structure
//! probe-matrix show blog
//!
//! # Start a new project file
//! probe-matrix init --output projects/example.yaml
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod checks;
mod cli;
mod config;
mod connection;
mod engine;
mod models;
mod output;

use cli::Args;
use config::{ProjectStore, PATH_ENV};
use models::Project;
use output::{MatrixFormatter, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let store = ProjectStore::new(&args.config_dirs);

    match args.command {
        cli::Command::Run(run_args) => run_project(&store, run_args).await,
        cli::Command::List(list_args) => list_projects(&store, list_args),
        cli::Command::Show(show_args) => show_project(&store, show_args),
        cli::Command::Init(init_args) => init_project(init_args),
    }
}

async fn run_project(store: &ProjectStore, args: cli::RunArgs) -> Result<()> {
    let project = store.load(&args.project)?;

    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", args.format))?;
    let mut formatter = MatrixFormatter::new(format);
    if args.no_color {
        formatter = formatter.no_color();
    }

    let matrix = engine::execute(&project).await?;
    let rendered = formatter.format(&matrix);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            println!("✓ Results saved to: {path}");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn list_projects(store: &ProjectStore, args: cli::ListArgs) -> Result<()> {
    let projects = store.list()?;

    if projects.is_empty() {
        println!("\nNo projects found.");
        println!(
            "   Searched: {}",
            store
                .paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("   Add directories with --config-dir or ${PATH_ENV},");
        println!("   or start one with: probe-matrix init\n");
        return Ok(());
    }

    println!("\nProjects ({} found)\n", projects.len());
    for project in &projects {
        if args.detailed {
            println!(
                "  {:20} - {} [{}]",
                project.id,
                project.name,
                project.path.display()
            );
        } else {
            println!("  {:20} - {}", project.id, project.name);
        }
    }
    println!();

    Ok(())
}

fn show_project(store: &ProjectStore, args: cli::ShowArgs) -> Result<()> {
    let project = store.load(&args.project)?;
    let outline = project.outline();

    let rendered = if args.format == "json" {
        serde_json::to_string_pretty(&outline)?
    } else {
        serde_yaml::to_string(&outline)?
    };
    println!("{rendered}");

    Ok(())
}

fn init_project(args: cli::InitArgs) -> Result<()> {
    let path = Path::new(&args.output);
    if path.exists() && !args.force {
        anyhow::bail!(
            "Project file already exists: {}. Use --force to overwrite.",
            args.output
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let example = Project::example();
    std::fs::write(path, serde_yaml::to_string(&example)?)?;

    info!("Wrote example project to {}", args.output);
    println!("✓ Example project created: {}", args.output);
    println!("\nEdit the file to describe your servers, then run it:");
    println!("\n  probe-matrix run {}\n", project_id(path));

    Ok(())
}

fn project_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("example")
        .to_string()
}
