use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    captcha::HumanVerified,
    error::AppError,
    state::AppState,
    votes::dto::VoteRequest,
};

pub fn vote_routes(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/polls/vote",
            post(submit_vote).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route("/polls/confirm_vote/:token", get(confirm_vote))
}

#[instrument(skip(state, _human, payload))]
pub async fn submit_vote(
    State(state): State<AppState>,
    _human: HumanVerified,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(req) = payload.map_err(|e| {
        warn!(error = %e, "rejected vote body");
        AppError::Validation("Bad request")
    })?;

    state
        .votes
        .submit_vote(&req.user_data.username, req.option_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, token))]
pub async fn confirm_vote(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Redirect, AppError> {
    let confirmed = state.votes.confirm_vote(&token).await?;
    info!(
        vote_id = confirmed.vote_id,
        poll_id = confirmed.poll_id,
        outcome = ?confirmed.outcome,
        "redirecting after confirmation"
    );
    Ok(Redirect::to(&confirmed.redirect_to))
}
