//! SQLite storage for cached pull requests.

mod model;
mod repository;

pub use model::PullRequestDB;
pub use repository::PullRequestRepository;
