//! JSON persistence of project snapshots.

mod project;
pub use project::ValidationError;

mod store;
pub use store::{LoadError, Project, ProjectStore, SaveError};
