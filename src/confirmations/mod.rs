pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::{ConfirmationStore, PgConfirmationStore};
pub use repo_types::Confirmation;
pub use services::{is_valid_token, TokenService};
