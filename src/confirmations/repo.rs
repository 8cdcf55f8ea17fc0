use axum::async_trait;
use sqlx::PgPool;

use crate::confirmations::repo_types::Confirmation;
use crate::error::StoreError;

#[async_trait]
pub trait ConfirmationStore: Send + Sync {
    async fn insert(&self, token: &str, vote_id: i32) -> Result<Confirmation, StoreError>;
    async fn find(&self, token: &str) -> Result<Confirmation, StoreError>;
}

#[derive(Clone)]
pub struct PgConfirmationStore {
    db: PgPool,
}

impl PgConfirmationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConfirmationStore for PgConfirmationStore {
    async fn insert(&self, token: &str, vote_id: i32) -> Result<Confirmation, StoreError> {
        let confirmation = sqlx::query_as::<_, Confirmation>(
            r#"
            INSERT INTO confirmations (token, vote_id)
            VALUES ($1, $2)
            RETURNING token, vote_id, created_at
            "#,
        )
        .bind(token)
        .bind(vote_id)
        .fetch_one(&self.db)
        .await?;
        Ok(confirmation)
    }

    async fn find(&self, token: &str) -> Result<Confirmation, StoreError> {
        sqlx::query_as::<_, Confirmation>(
            r#"
            SELECT token, vote_id, created_at
              FROM confirmations
             WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound("confirmation"))
    }
}
