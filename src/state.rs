use std::sync::Arc;

use sqlx::PgPool;
use tracing::warn;

use crate::captcha::{CaptchaVerifier, RecaptchaVerifier};
use crate::config::AppConfig;
use crate::confirmations::{ConfirmationStore, PgConfirmationStore, TokenService};
use crate::mailer::{Mailer, SmtpMailer};
use crate::polls::{PgPollStore, PollStore};
use crate::users::{PgUserRepository, UserRepository};
use crate::votes::{PgVoteLedger, VoteLedger, VoteService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub polls: Arc<dyn PollStore>,
    pub votes: Arc<VoteService>,
    /// `None` when recaptcha verification is disabled.
    pub captcha: Option<Arc<dyn CaptchaVerifier>>,
}

impl AppState {
    pub fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let mailer = Arc::new(SmtpMailer::new(&config.email)?) as Arc<dyn Mailer>;

        let captcha = RecaptchaVerifier::from_config(&config.recaptcha)
            .map(|v| Arc::new(v) as Arc<dyn CaptchaVerifier>);
        if captcha.is_none() {
            warn!("RECAPTCHA_SECRET not set; recaptcha verification disabled");
        }

        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgPollStore::new(db.clone())),
            Arc::new(PgVoteLedger::new(db.clone())),
            Arc::new(PgConfirmationStore::new(db)),
            mailer,
            captcha,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepository>,
        polls: Arc<dyn PollStore>,
        ledger: Arc<dyn VoteLedger>,
        confirmations: Arc<dyn ConfirmationStore>,
        mailer: Arc<dyn Mailer>,
        captcha: Option<Arc<dyn CaptchaVerifier>>,
    ) -> Self {
        let votes = Arc::new(VoteService::new(
            config.clone(),
            users,
            polls.clone(),
            ledger,
            TokenService::new(confirmations),
            mailer,
        ));
        Self {
            config,
            polls,
            votes,
            captcha,
        }
    }
}
