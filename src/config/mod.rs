//! Configuration
//!
//! Discovery and loading of project files from a search path.

mod store;

pub use store::{ProjectStore, ProjectSummary, PATH_ENV};
