use axum::async_trait;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::users::repo_types::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return the user owning `email`, creating it when absent.
    ///
    /// Concurrent calls with the same email yield the same row.
    async fn resolve_user(&self, email: &str) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn resolve_user(&self, email: &str) -> Result<User, StoreError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, created_at
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }
}
