use serde::Deserialize;

/// Body of `POST /polls/vote`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_id: i32,
    pub user_data: UserData,
}

#[derive(Debug, Deserialize)]
pub struct UserData {
    pub username: String,
}
