//! Server x test result matrix
//!
//! The finished, render-ready form of one probe run.

#![allow(dead_code)]

use serde::Serialize;

use super::outcome::{ResultEntry, Status};

/// One matrix cell: formatted outcome, status, elapsed milliseconds.
/// Serializes as a 3-element array; the test identity is implicit in the
/// cell's position within its row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell(pub String, pub Status, pub u64);

impl From<&ResultEntry> for Cell {
    fn from(entry: &ResultEntry) -> Self {
        Cell(entry.outcome.clone(), entry.status.clone(), entry.elapsed_ms)
    }
}

/// One server row, aligned positionally with the matrix's test names.
/// `None` means the test was never run against this server.
#[derive(Clone, Debug, Serialize)]
pub struct ServerResults {
    pub name: String,
    pub results: Vec<Option<Cell>>,
}

/// The full result of one probe run
#[derive(Clone, Debug, Serialize)]
pub struct ResultMatrix {
    pub project: String,
    pub tests: Vec<String>,
    pub servers: Vec<ServerResults>,
}

impl ResultMatrix {
    pub fn row(&self, server: &str) -> Option<&ServerResults> {
        self.servers.iter().find(|row| row.name == server)
    }
}
