//! Data models for probe runs
//!
//! This module contains all data structures used throughout the application.

mod matrix;
mod outcome;
mod project;

pub use matrix::{Cell, ResultMatrix, ServerResults};
pub use outcome::{Evaluation, Outcome, ResultEntry, Status};
pub use project::{
    CheckKind, CheckSpec, ConnectionKind, ConnectionSpec, Project, ProjectOutline, RequestSpec,
    Server,
};
