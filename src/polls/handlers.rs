use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    error::AppError,
    polls::dto::{OptionResult, PollResponse, ResultsSummary},
    state::AppState,
};

pub fn poll_routes() -> Router<AppState> {
    Router::new()
        .route("/polls/:id", get(get_poll))
        .route("/polls/:id/results", get(get_results))
}

#[instrument(skip(state))]
pub async fn get_poll(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PollResponse>, AppError> {
    let poll = state.polls.get_poll(id, true).await.map_err(|e| {
        warn!(error = %e, poll_id = id, "get_poll failed");
        AppError::from(e)
    })?;
    Ok(Json(poll.into()))
}

#[instrument(skip(state))]
pub async fn get_results(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ResultsSummary>, AppError> {
    let tally = state.votes.results(id).await?;
    let summary = tally
        .into_iter()
        .map(|t| OptionResult {
            id: t.id,
            content: t.content,
            count: t.count,
        })
        .collect();
    Ok(Json(ResultsSummary { summary }))
}
