use sqlx::FromRow;
use time::OffsetDateTime;

/// One vote attempt. Pending while `confirmed_at` is `None`.
#[derive(Debug, Clone, FromRow)]
pub struct Vote {
    pub id: i32,
    pub user_id: i32,
    pub option_id: i32,
    pub confirmed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl Vote {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }
}

/// Result of finalizing a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// `confirmed_at` was set by this call.
    Finalized,
    /// The vote was confirmed earlier; nothing changed.
    AlreadyFinalized,
    /// Another vote of the same user on the same poll is confirmed; nothing changed.
    Superseded,
}

#[derive(Debug, Clone, FromRow)]
pub struct OptionTally {
    pub id: i32,
    pub content: String,
    pub count: i64,
}
