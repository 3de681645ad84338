//! Result aggregation
//!
//! Folds worker contributions into the server x test matrix. Runs on the
//! coordinating task only, after every worker has returned.

use std::collections::HashMap;

use crate::models::{Cell, Project, ResultEntry, ResultMatrix, ServerResults};

/// Build the matrix from per-worker contributions. Contributions arrive in
/// worker launch order; when two workers for the same server produced an
/// entry for the same test identity, the later contribution wins.
pub fn build_matrix(
    project: &Project,
    test_names: Vec<String>,
    contributions: Vec<(String, Vec<ResultEntry>)>,
) -> ResultMatrix {
    let mut by_server: HashMap<String, HashMap<usize, ResultEntry>> = HashMap::new();

    for (server, entries) in contributions {
        let slot = by_server.entry(server).or_default();
        for entry in entries {
            slot.insert(entry.test_id, entry);
        }
    }

    let servers = project
        .servers
        .iter()
        .map(|server| {
            let found = by_server.remove(&server.name).unwrap_or_default();
            ServerResults {
                name: server.name.clone(),
                results: (0..test_names.len())
                    .map(|id| found.get(&id).map(Cell::from))
                    .collect(),
            }
        })
        .collect();

    ResultMatrix {
        project: project.name.clone(),
        tests: test_names,
        servers,
    }
}
