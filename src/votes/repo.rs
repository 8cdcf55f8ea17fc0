use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::StoreError;
use crate::votes::filter::VoteFilter;
use crate::votes::repo_types::{FinalizeOutcome, OptionTally, Vote};

/// Pending and confirmed votes.
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Whether `user_id` has a confirmed vote on any option of `poll_id`.
    async fn has_confirmed_vote(&self, user_id: i32, poll_id: i32) -> Result<bool, StoreError>;

    /// Insert a pending vote. Several pending votes per user and poll may coexist.
    async fn record_pending_vote(&self, user_id: i32, option_id: i32) -> Result<Vote, StoreError>;

    /// Set `confirmed_at` on a pending vote of `poll_id`.
    ///
    /// Serialized per (user, poll): at most one vote of a user on a poll ends up confirmed.
    async fn finalize_vote(
        &self,
        vote_id: i32,
        poll_id: i32,
        confirmed_at: OffsetDateTime,
    ) -> Result<FinalizeOutcome, StoreError>;

    async fn get_vote(&self, vote_id: i32) -> Result<Vote, StoreError>;

    /// Confirmed votes per option of `poll_id`, in option order, zero counts included.
    async fn tally(&self, poll_id: i32) -> Result<Vec<OptionTally>, StoreError>;
}

#[derive(Clone)]
pub struct PgVoteLedger {
    db: PgPool,
}

impl PgVoteLedger {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoteLedger for PgVoteLedger {
    async fn has_confirmed_vote(&self, user_id: i32, poll_id: i32) -> Result<bool, StoreError> {
        let mut qb = VoteFilter::new()
            .user(user_id)
            .poll(poll_id)
            .confirmed(true)
            .exists();
        let (found,) = qb.build_query_as::<(bool,)>().fetch_one(&self.db).await?;
        Ok(found)
    }

    async fn record_pending_vote(&self, user_id: i32, option_id: i32) -> Result<Vote, StoreError> {
        let vote = sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO votes (user_id, option_id)
            VALUES ($1, $2)
            RETURNING id, user_id, option_id, confirmed_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(option_id)
        .fetch_one(&self.db)
        .await?;
        Ok(vote)
    }

    async fn finalize_vote(
        &self,
        vote_id: i32,
        poll_id: i32,
        confirmed_at: OffsetDateTime,
    ) -> Result<FinalizeOutcome, StoreError> {
        let mut tx = self.db.begin().await?;

        let (user_id,) = sqlx::query_as::<_, (i32,)>("SELECT user_id FROM votes WHERE id = $1")
            .bind(vote_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("vote"))?;

        // Released on commit or rollback.
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(user_id)
            .bind(poll_id)
            .execute(&mut *tx)
            .await?;

        let mut qb = VoteFilter::new().id(vote_id).select();
        qb.push(" FOR UPDATE OF v");
        let vote = qb
            .build_query_as::<Vote>()
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("vote"))?;
        if vote.is_confirmed() {
            return Ok(FinalizeOutcome::AlreadyFinalized);
        }

        let mut qb = VoteFilter::new()
            .user(user_id)
            .poll(poll_id)
            .excluding(vote_id)
            .confirmed(true)
            .exists();
        let (other_confirmed,) = qb.build_query_as::<(bool,)>().fetch_one(&mut *tx).await?;
        if other_confirmed {
            debug!(vote_id, user_id, poll_id, "another vote already confirmed");
            return Ok(FinalizeOutcome::Superseded);
        }

        let updated = sqlx::query(
            r#"
            UPDATE votes
               SET confirmed_at = $2
             WHERE id = $1 AND confirmed_at IS NULL
            "#,
        )
        .bind(vote_id)
        .bind(confirmed_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(if updated == 1 {
            FinalizeOutcome::Finalized
        } else {
            FinalizeOutcome::AlreadyFinalized
        })
    }

    async fn get_vote(&self, vote_id: i32) -> Result<Vote, StoreError> {
        let mut qb = VoteFilter::new().id(vote_id).select();
        let vote = qb.build_query_as::<Vote>().fetch_optional(&self.db).await?;
        vote.ok_or(StoreError::NotFound("vote"))
    }

    async fn tally(&self, poll_id: i32) -> Result<Vec<OptionTally>, StoreError> {
        let rows = sqlx::query_as::<_, OptionTally>(
            r#"
            SELECT o.id, o.content, COUNT(v.id) AS count
              FROM options o
              LEFT JOIN votes v
                ON v.option_id = o.id AND v.confirmed_at IS NOT NULL
             WHERE o.poll_id = $1
             GROUP BY o.id, o.content
             ORDER BY o.id ASC
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
