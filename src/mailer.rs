use askama::Template;
use axum::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::debug;

use crate::config::EmailConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("cannot build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("template: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Body of the vote confirmation email.
#[derive(Template)]
#[template(path = "confirm_vote.html")]
pub struct ConfirmVoteEmail<'a> {
    pub receiver: &'a str,
    pub service_name: &'a str,
    pub poll_title: &'a str,
    pub vote_option: &'a str,
    pub link: &'a str,
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &EmailConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)?
            .port(cfg.smtp_port)
            .credentials(Credentials::new(
                cfg.smtp_username.clone(),
                cfg.smtp_password.clone(),
            ))
            .build();
        let from = cfg.sender_email.parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to.parse::<Mailbox>()?)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body)?;
        self.transport.send(message).await?;
        debug!(to = %mail.to, "email sent");
        Ok(())
    }
}
