use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use crate::confirmations::repo::ConfirmationStore;
use crate::confirmations::repo_types::Confirmation;
use crate::error::StoreError;

/// Width of the `confirmations.token` column.
const MAX_TOKEN_LEN: usize = 192;

pub fn is_valid_token(token: &str) -> bool {
    lazy_static! {
        static ref TOKEN_RE: Regex = Regex::new(r"^[A-Za-z0-9\-]+$").unwrap();
    }
    token.len() <= MAX_TOKEN_LEN && TOKEN_RE.is_match(token)
}

/// Issues and resolves vote confirmation tokens.
///
/// Tokens are not consumed here: single use is enforced when the vote is finalized.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn ConfirmationStore>,
}

impl TokenService {
    pub fn new(store: Arc<dyn ConfirmationStore>) -> Self {
        Self { store }
    }

    pub async fn issue_token(&self, vote_id: i32) -> Result<String, StoreError> {
        let token = Uuid::new_v4().to_string();
        self.store.insert(&token, vote_id).await?;
        debug!(vote_id, "confirmation token issued");
        Ok(token)
    }

    pub async fn resolve_token(&self, token: &str) -> Result<Confirmation, StoreError> {
        if !is_valid_token(token) {
            return Err(StoreError::NotFound("confirmation"));
        }
        self.store.find(token).await
    }
}
