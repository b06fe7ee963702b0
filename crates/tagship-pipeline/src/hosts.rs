//! Release hosts

mod directory;
mod github;
mod memory;

pub use directory::DirectoryHost;
pub use github::GithubCliHost;
pub use memory::{InMemoryHost, StoredRelease};
