use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct PollRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_readonly: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct Poll {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_readonly: bool,
    pub created_at: OffsetDateTime,
    /// Empty unless the poll was loaded with its options.
    pub options: Vec<PollOption>,
}

impl Poll {
    pub fn is_accepting_votes(&self) -> bool {
        !self.is_readonly
    }
}

impl From<PollRow> for Poll {
    fn from(r: PollRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            is_readonly: r.is_readonly,
            created_at: r.created_at,
            options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OptionRow {
    pub id: i32,
    pub poll_id: i32,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PollOption {
    pub id: i32,
    pub poll_id: i32,
    pub content: String,
    pub extras: Vec<OptionExtra>,
}

impl From<OptionRow> for PollOption {
    fn from(r: OptionRow) -> Self {
        Self {
            id: r.id,
            poll_id: r.poll_id,
            content: r.content,
            extras: Vec::new(),
        }
    }
}

/// Key/value annotation on an option, e.g. an image url.
#[derive(Debug, Clone, FromRow)]
pub struct OptionExtra {
    pub id: i32,
    pub option_id: i32,
    pub kind: String,
    pub value: Option<String>,
}
