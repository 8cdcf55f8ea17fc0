use serde::Serialize;

use crate::polls::repo_types::{OptionExtra, Poll, PollOption};

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub options: Vec<OptionResponse>,
}

#[derive(Debug, Serialize)]
pub struct OptionResponse {
    pub id: i32,
    pub content: String,
    pub extras: Vec<ExtraResponse>,
}

#[derive(Debug, Serialize)]
pub struct ExtraResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ResultsSummary {
    pub summary: Vec<OptionResult>,
}

#[derive(Debug, Serialize)]
pub struct OptionResult {
    pub id: i32,
    pub content: String,
    pub count: i64,
}

impl From<Poll> for PollResponse {
    fn from(p: Poll) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description.unwrap_or_default(),
            options: p.options.into_iter().map(OptionResponse::from).collect(),
        }
    }
}

impl From<PollOption> for OptionResponse {
    fn from(o: PollOption) -> Self {
        Self {
            id: o.id,
            content: o.content,
            extras: o.extras.into_iter().map(ExtraResponse::from).collect(),
        }
    }
}

impl From<OptionExtra> for ExtraResponse {
    fn from(e: OptionExtra) -> Self {
        Self {
            kind: e.kind,
            value: e.value.unwrap_or_default(),
        }
    }
}
