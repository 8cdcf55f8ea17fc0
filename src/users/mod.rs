pub mod repo;
pub mod repo_types;

pub use repo::{PgUserRepository, UserRepository};
pub use repo_types::User;
