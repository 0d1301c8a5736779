//! Commit records fetched for member analytics.
//!
//! Commits are not persisted; they feed the per-member analytics pass and
//! are discarded once the derived stats blob is cached.

use serde::{Deserialize, Serialize};

/// A single commit as fetched from the source host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    pub repo_name: String,
    pub author_login: Option<String>,
    pub author_email: Option<String>,
    pub message: String,
    pub html_url: Option<String>,
    /// Commit author date, RFC3339.
    pub authored_at: String,
}
