use std::sync::Arc;

use askama::Template;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;
use crate::confirmations::{is_valid_token, TokenService};
use crate::error::StoreError;
use crate::mailer::{ConfirmVoteEmail, MailError, Mailer, OutgoingMail};
use crate::polls::PollStore;
use crate::users::UserRepository;
use crate::votes::repo::VoteLedger;
use crate::votes::repo_types::{FinalizeOutcome, OptionTally, Vote};

const MAX_USERNAME_LEN: usize = 64;

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("invalid username")]
    InvalidUsername,

    #[error("invalid confirmation token")]
    InvalidToken,

    #[error("option {0} not found")]
    OptionNotFound(i32),

    #[error("poll {0} not found")]
    PollNotFound(i32),

    #[error("unknown confirmation token")]
    TokenNotFound,

    #[error("poll {0} does not accept votes")]
    PollClosed(i32),

    #[error("user has already voted")]
    AlreadyVoted,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot send confirmation email: {0}")]
    Mail(#[from] MailError),
}

fn or_not_found(err: StoreError, not_found: VoteError) -> VoteError {
    if err.is_not_found() {
        not_found
    } else {
        VoteError::Store(err)
    }
}

/// Maps a username to its organization email. `None` if the username is not alphanumeric.
///
/// Usernames are lowercased so one mailbox maps to one user.
pub fn username_to_email(username: &str, organization_domain: &str) -> Option<String> {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
    }
    if username.len() >= MAX_USERNAME_LEN || !USERNAME_RE.is_match(username) {
        return None;
    }
    Some(format!(
        "{}@{}",
        username.to_lowercase(),
        organization_domain
    ))
}

#[derive(Debug, Clone)]
pub struct ConfirmedVote {
    pub vote_id: i32,
    pub poll_id: i32,
    pub outcome: FinalizeOutcome,
    pub redirect_to: String,
}

/// Runs the two halves of the voting protocol: submission and confirmation.
pub struct VoteService {
    config: Arc<AppConfig>,
    users: Arc<dyn UserRepository>,
    polls: Arc<dyn PollStore>,
    ledger: Arc<dyn VoteLedger>,
    tokens: TokenService,
    mailer: Arc<dyn Mailer>,
}

impl VoteService {
    pub fn new(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepository>,
        polls: Arc<dyn PollStore>,
        ledger: Arc<dyn VoteLedger>,
        tokens: TokenService,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            users,
            polls,
            ledger,
            tokens,
            mailer,
        }
    }

    /// Record a pending vote and mail its confirmation link.
    ///
    /// A failed email leaves the pending vote and its token in place; resubmitting
    /// creates another pending vote.
    #[instrument(skip(self, username))]
    pub async fn submit_vote(&self, username: &str, option_id: i32) -> Result<Vote, VoteError> {
        let email = username_to_email(username, &self.config.email.organization_domain)
            .ok_or_else(|| {
                warn!(username_len = username.len(), "invalid username");
                VoteError::InvalidUsername
            })?;

        let option = self
            .polls
            .get_option(option_id)
            .await
            .map_err(|e| or_not_found(e, VoteError::OptionNotFound(option_id)))?;
        let poll = self
            .polls
            .get_poll(option.poll_id, false)
            .await
            .map_err(|e| or_not_found(e, VoteError::OptionNotFound(option_id)))?;
        if !poll.is_accepting_votes() {
            warn!(poll_id = poll.id, "vote on readonly poll");
            return Err(VoteError::PollClosed(poll.id));
        }

        let user = self.users.resolve_user(&email).await?;
        if self.ledger.has_confirmed_vote(user.id, poll.id).await? {
            warn!(user_id = user.id, poll_id = poll.id, "user has already voted");
            return Err(VoteError::AlreadyVoted);
        }

        let vote = self.ledger.record_pending_vote(user.id, option.id).await?;
        let token = self.tokens.issue_token(vote.id).await?;

        let link = self.config.web.confirmation_url(&token);
        let html_body = ConfirmVoteEmail {
            receiver: &email,
            service_name: &self.config.email.service_name,
            poll_title: &poll.title,
            vote_option: &option.content,
            link: &link,
        }
        .render()
        .map_err(MailError::from)?;

        self.mailer
            .send(OutgoingMail {
                to: email,
                subject: self.config.email.subject.clone(),
                html_body,
            })
            .await
            .map_err(|e| {
                error!(error = %e, vote_id = vote.id, user_id = user.id, "cannot send confirmation email");
                e
            })?;

        info!(vote_id = vote.id, user_id = user.id, poll_id = poll.id, "pending vote recorded");
        Ok(vote)
    }

    /// Exchange a confirmation token for a confirmed vote.
    ///
    /// Confirming the same vote again succeeds without changes. Confirming a vote when
    /// another vote of the same user on that poll is already confirmed fails with
    /// [`VoteError::AlreadyVoted`].
    #[instrument(skip(self, token))]
    pub async fn confirm_vote(&self, token: &str) -> Result<ConfirmedVote, VoteError> {
        if !is_valid_token(token) {
            warn!("invalid token format");
            return Err(VoteError::InvalidToken);
        }

        let confirmation = self
            .tokens
            .resolve_token(token)
            .await
            .map_err(|e| or_not_found(e, VoteError::TokenNotFound))?;
        let vote = self
            .ledger
            .get_vote(confirmation.vote_id)
            .await
            .map_err(|e| or_not_found(e, VoteError::TokenNotFound))?;
        let option = self.polls.get_option(vote.option_id).await?;
        let poll = self.polls.get_poll(option.poll_id, false).await?;

        if !poll.is_accepting_votes() {
            warn!(poll_id = poll.id, vote_id = vote.id, "confirmation on readonly poll");
            return Err(VoteError::PollClosed(poll.id));
        }

        let outcome = self
            .ledger
            .finalize_vote(vote.id, poll.id, OffsetDateTime::now_utc())
            .await?;
        match outcome {
            FinalizeOutcome::Finalized => {
                info!(vote_id = vote.id, user_id = vote.user_id, poll_id = poll.id, "vote confirmed");
            }
            FinalizeOutcome::AlreadyFinalized => {
                info!(vote_id = vote.id, poll_id = poll.id, "vote was already confirmed");
            }
            FinalizeOutcome::Superseded => {
                warn!(vote_id = vote.id, user_id = vote.user_id, poll_id = poll.id, "another vote already confirmed");
                return Err(VoteError::AlreadyVoted);
            }
        }

        Ok(ConfirmedVote {
            vote_id: vote.id,
            poll_id: poll.id,
            outcome,
            redirect_to: self.config.web.redirect_for_poll(poll.id),
        })
    }

    /// Confirmed vote counts for every option of a poll.
    #[instrument(skip(self))]
    pub async fn results(&self, poll_id: i32) -> Result<Vec<OptionTally>, VoteError> {
        self.polls
            .get_poll(poll_id, false)
            .await
            .map_err(|e| or_not_found(e, VoteError::PollNotFound(poll_id)))?;
        Ok(self.ledger.tally(poll_id).await?)
    }
}
