//! GitHub REST access for issuepulse.
//!
//! Lists every issue and pull request of a repository page by page,
//! attaches comment bodies, and posts generated replies back.

mod client;
mod repo;

pub use client::{FetchOutcome, GitHubClient};
pub use repo::RepoRef;
