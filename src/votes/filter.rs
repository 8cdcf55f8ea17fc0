use sqlx::{Postgres, QueryBuilder};

const SELECT_VOTES: &str = r#"
    SELECT v.id, v.user_id, v.option_id, v.confirmed_at, v.created_at
      FROM votes v
      JOIN options o ON o.id = v.option_id
"#;

const EXISTS_VOTES: &str = r#"
    SELECT EXISTS (
        SELECT 1
          FROM votes v
          JOIN options o ON o.id = v.option_id
"#;

/// Conditions on votes. A `None` field is not filtered on; `Some(0)` matches id 0.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VoteFilter {
    pub id: Option<i32>,
    pub user_id: Option<i32>,
    pub poll_id: Option<i32>,
    pub exclude_id: Option<i32>,
    pub confirmed: Option<bool>,
}

impl VoteFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn user(mut self, user_id: i32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn poll(mut self, poll_id: i32) -> Self {
        self.poll_id = Some(poll_id);
        self
    }

    pub fn excluding(mut self, vote_id: i32) -> Self {
        self.exclude_id = Some(vote_id);
        self
    }

    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = Some(confirmed);
        self
    }

    /// `SELECT` of full vote rows matching the filter.
    pub fn select(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(SELECT_VOTES);
        self.push_where(&mut qb);
        qb
    }

    /// `SELECT EXISTS (...)` over the filter, yielding one bool.
    pub fn exists(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(EXISTS_VOTES);
        self.push_where(&mut qb);
        qb.push(")");
        qb
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(id) = self.id {
            qb.push(" AND v.id = ").push_bind(id);
        }
        if let Some(user_id) = self.user_id {
            qb.push(" AND v.user_id = ").push_bind(user_id);
        }
        if let Some(poll_id) = self.poll_id {
            qb.push(" AND o.poll_id = ").push_bind(poll_id);
        }
        if let Some(exclude_id) = self.exclude_id {
            qb.push(" AND v.id <> ").push_bind(exclude_id);
        }
        match self.confirmed {
            Some(true) => {
                qb.push(" AND v.confirmed_at IS NOT NULL");
            }
            Some(false) => {
                qb.push(" AND v.confirmed_at IS NULL");
            }
            None => {}
        }
    }
}
