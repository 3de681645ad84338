//! Probe execution engine
//!
//! One run: compile the plan, fan workers out, join them all, aggregate.

mod aggregate;
mod plan;
mod scheduler;
mod worker;

pub use plan::TestPlan;

use anyhow::Result;
use std::time::Instant;
use tracing::info;

use crate::models::{Project, ResultMatrix};

/// Execute one probe run: assign test identities, fan out one worker per
/// applicable (server, connection) pair, and fold every contribution into
/// the result matrix. Only structural failures (a malformed project, an
/// uncompilable pattern) abort the run; everything else lands in the matrix.
pub async fn execute(project: &Project) -> Result<ResultMatrix> {
    project.validate()?;
    let plan = TestPlan::build(project)?;

    info!(
        "Starting probe run for {} ({} servers, {} tests)",
        project.name,
        project.servers.len(),
        plan.test_count()
    );

    let started = Instant::now();
    let contributions = scheduler::fan_out(project, &plan).await;
    let matrix = aggregate::build_matrix(project, plan.into_test_names(), contributions);

    info!(
        "Probe run for {} completed in {}ms",
        project.name,
        started.elapsed().as_millis()
    );

    Ok(matrix)
}
