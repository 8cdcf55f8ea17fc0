use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Voter identity, created on the first vote under a new email.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub created_at: OffsetDateTime,
}
