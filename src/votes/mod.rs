mod dto;
pub mod filter;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{PgVoteLedger, VoteLedger};
pub use services::{VoteError, VoteService};

pub fn router(max_body_bytes: usize) -> Router<AppState> {
    Router::new().merge(handlers::vote_routes(max_body_bytes))
}
