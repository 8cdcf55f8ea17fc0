use sqlx::FromRow;
use time::OffsetDateTime;

/// Token issued for one vote. Kept after use so the link stays resolvable.
#[derive(Debug, Clone, FromRow)]
pub struct Confirmation {
    pub token: String,
    pub vote_id: i32,
    pub created_at: OffsetDateTime,
}
