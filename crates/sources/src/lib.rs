//! External source clients for DevPulse.
//!
//! Thin, retryless fetch layers over the GitHub and Jira HTTP APIs. The
//! providers implement the source traits from `devpulse-core`; pagination
//! and field normalization happen here, persistence and orchestration do
//! not.

pub mod errors;
pub mod provider;

pub use errors::SourceError;
pub use provider::github::GithubProvider;
pub use provider::jira::JiraProvider;
