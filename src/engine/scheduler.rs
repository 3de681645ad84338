//! Execution scheduler
//!
//! Fans one worker task out per applicable (server, connection) pair and
//! joins them all. Fan-out is unconditional: the pair count is set entirely
//! by the project, with no batching and no backpressure.

use futures::future::join_all;
use tracing::{debug, error, info};

use super::plan::TestPlan;
use super::worker;
use crate::models::{Project, ResultEntry};

/// Launch all workers and wait for every one of them. Contributions come
/// back as (server name, entries) in launch order; a panicked worker task
/// contributes an empty list rather than aborting its siblings.
pub async fn fan_out(project: &Project, plan: &TestPlan) -> Vec<(String, Vec<ResultEntry>)> {
    let mut names = Vec::new();
    let mut handles = Vec::new();

    for server in &project.servers {
        for (index, spec) in project.connections.iter().enumerate() {
            if !spec.applies_to(server) {
                continue;
            }
            debug!(
                "Launching {} worker for {} on port {}",
                spec.kind,
                server.name,
                spec.port()
            );
            names.push(server.name.clone());
            handles.push(tokio::spawn(worker::probe(
                server.clone(),
                spec.clone(),
                plan.connection_checks(index),
            )));
        }
    }

    info!(
        "Launched {} probe workers for {}",
        handles.len(),
        project.name
    );

    let joined = join_all(handles).await;

    names
        .into_iter()
        .zip(joined)
        .map(|(name, result)| match result {
            Ok(entries) => (name, entries),
            Err(err) => {
                error!("Probe worker for {} died: {}", name, err);
                (name, Vec::new())
            }
        })
        .collect()
}
