pub mod fetch;
pub mod workspace;

pub use fetch::{clone_repository, validate_repo_url};
pub use workspace::{Workspace, WorkspaceRegistry};
