//! Run plan
//!
//! Compiles a project's checks and assigns run-scoped test identities:
//! dense 0..N-1, by position in the flattened declaration order. Identities
//! are reassigned on every run.

#![allow(dead_code)]

use anyhow::Result;

use crate::checks::Check;
use crate::models::Project;

/// Compiled checks for one run, grouped by connection and request
pub struct TestPlan {
    test_names: Vec<String>,
    by_connection: Vec<Vec<Vec<Check>>>,
}

impl TestPlan {
    pub fn build(project: &Project) -> Result<Self> {
        let mut test_names = Vec::new();
        let mut by_connection = Vec::with_capacity(project.connections.len());

        for connection in &project.connections {
            let mut by_request = Vec::with_capacity(connection.requests.len());
            for request in &connection.requests {
                let mut compiled = Vec::with_capacity(request.checks.len());
                for spec in &request.checks {
                    let check = Check::compile(test_names.len(), spec)?;
                    test_names.push(check.name.clone());
                    compiled.push(check);
                }
                by_request.push(compiled);
            }
            by_connection.push(by_request);
        }

        Ok(Self {
            test_names,
            by_connection,
        })
    }

    pub fn test_count(&self) -> usize {
        self.test_names.len()
    }

    pub fn test_names(&self) -> &[String] {
        &self.test_names
    }

    pub fn into_test_names(self) -> Vec<String> {
        self.test_names
    }

    /// Per-request compiled checks for one connection spec, cloned for a
    /// worker to own
    pub fn connection_checks(&self, index: usize) -> Vec<Vec<Check>> {
        self.by_connection[index].clone()
    }
}
