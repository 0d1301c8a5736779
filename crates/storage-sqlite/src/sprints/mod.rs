//! SQLite storage for cached sprints.

mod model;
mod repository;

pub use model::SprintDB;
pub use repository::SprintRepository;
