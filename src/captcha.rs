use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::ORIGIN, request::Parts},
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::RecaptchaConfig;
use crate::error::AppError;
use crate::state::AppState;

pub const RECAPTCHA_HEADER: &str = "g-recaptcha-response";

const MAX_TOKEN_LEN: usize = 1024;
const MAX_ORIGIN_LEN: usize = 384;

#[derive(Error, Debug)]
#[error("recaptcha request failed: {0}")]
pub struct CaptchaError(#[from] reqwest::Error);

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// `Ok(false)` when the provider rejects the token.
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError>;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    endpoint: String,
    min_score: f32,
}

impl RecaptchaVerifier {
    /// `None` when no secret is configured.
    pub fn from_config(cfg: &RecaptchaConfig) -> Option<Self> {
        let secret = cfg.secret.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            secret,
            endpoint: cfg.verify_endpoint.clone(),
            min_score: cfg.min_score,
        })
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool, CaptchaError> {
        let resp: VerifyResponse = self
            .client
            .post(&self.endpoint)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(accepts(&resp, self.min_score))
    }
}

fn accepts(resp: &VerifyResponse, min_score: f32) -> bool {
    if !resp.success {
        warn!(errors = ?resp.error_codes, "recaptcha rejected token");
        return false;
    }
    match resp.score {
        Some(score) if score < min_score => {
            warn!(score, min_score, "recaptcha score too low");
            false
        }
        _ => true,
    }
}

fn is_well_formed(token: &str) -> bool {
    lazy_static! {
        static ref CAPTCHA_RE: Regex = Regex::new(r"^[A-Za-z0-9\-_]+$").unwrap();
    }
    token.len() <= MAX_TOKEN_LEN && CAPTCHA_RE.is_match(token)
}

/// Passes only when the request carries a recaptcha token the provider accepts.
pub struct HumanVerified;

#[async_trait]
impl FromRequestParts<AppState> for HumanVerified {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(verifier) = state.captcha.as_ref() else {
            return Ok(HumanVerified);
        };

        let origin_len = parts.headers.get(ORIGIN).map(|v| v.len()).unwrap_or(0);
        let token = parts
            .headers
            .get(RECAPTCHA_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if origin_len > MAX_ORIGIN_LEN || !is_well_formed(token) {
            warn!(origin_len, token_len = token.len(), "missing or malformed recaptcha header");
            return Err(AppError::Validation("Invalid recaptcha token"));
        }

        match verifier.verify(token).await {
            Ok(true) => Ok(HumanVerified),
            Ok(false) => Err(AppError::Validation("Invalid recaptcha token")),
            Err(e) => {
                error!(error = %e, "recaptcha verification error");
                Err(AppError::Validation("Invalid recaptcha token"))
            }
        }
    }
}
