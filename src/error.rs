use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::votes::VoteError;

/// Failure of a repository call.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("user has already voted")]
    AlreadyVoted,

    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyVoted => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::Database(e) => {
                error!(error = %e, "storage failure");
                AppError::Internal
            }
        }
    }
}

impl From<VoteError> for AppError {
    fn from(e: VoteError) -> Self {
        match e {
            VoteError::InvalidUsername
            | VoteError::InvalidToken
            | VoteError::OptionNotFound(_)
            | VoteError::TokenNotFound => AppError::Validation("Bad request"),
            VoteError::PollClosed(_) => AppError::Validation("Poll is closed"),
            VoteError::PollNotFound(_) => AppError::NotFound("poll"),
            VoteError::AlreadyVoted => AppError::AlreadyVoted,
            VoteError::Store(e) => e.into(),
            VoteError::Mail(e) => {
                error!(error = %e, "email dispatch failure");
                AppError::Internal
            }
        }
    }
}
