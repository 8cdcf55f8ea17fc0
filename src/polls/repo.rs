use axum::async_trait;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::polls::repo_types::{OptionExtra, OptionRow, Poll, PollOption, PollRow};

/// Read-only access to polls and their options.
#[async_trait]
pub trait PollStore: Send + Sync {
    async fn get_option(&self, option_id: i32) -> Result<PollOption, StoreError>;

    /// With `include_options`, options come in poll order, each with its extras.
    async fn get_poll(&self, poll_id: i32, include_options: bool) -> Result<Poll, StoreError>;
}

#[derive(Clone)]
pub struct PgPollStore {
    db: PgPool,
}

impl PgPollStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn options_with_extras(&self, poll_id: i32) -> Result<Vec<PollOption>, StoreError> {
        let rows = sqlx::query_as::<_, OptionRow>(
            r#"
            SELECT id, poll_id, content
              FROM options
             WHERE poll_id = $1
             ORDER BY id ASC
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let extras = sqlx::query_as::<_, OptionExtra>(
            r#"
            SELECT id, option_id, type AS kind, content AS value
              FROM option_extras
             WHERE option_id = ANY($1)
             ORDER BY id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut options: Vec<PollOption> = rows.into_iter().map(PollOption::from).collect();
        for extra in extras {
            if let Some(opt) = options.iter_mut().find(|o| o.id == extra.option_id) {
                opt.extras.push(extra);
            }
        }
        Ok(options)
    }
}

#[async_trait]
impl PollStore for PgPollStore {
    async fn get_option(&self, option_id: i32) -> Result<PollOption, StoreError> {
        let row = sqlx::query_as::<_, OptionRow>(
            r#"
            SELECT id, poll_id, content
              FROM options
             WHERE id = $1
            "#,
        )
        .bind(option_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound("option"))?;
        Ok(row.into())
    }

    async fn get_poll(&self, poll_id: i32, include_options: bool) -> Result<Poll, StoreError> {
        let row = sqlx::query_as::<_, PollRow>(
            r#"
            SELECT id, title, description, is_readonly, created_at
              FROM polls
             WHERE id = $1
            "#,
        )
        .bind(poll_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound("poll"))?;

        let mut poll = Poll::from(row);
        if include_options {
            poll.options = self.options_with_extras(poll_id).await?;
        }
        Ok(poll)
    }
}
