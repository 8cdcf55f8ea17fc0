use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_headers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    /// Scheme, host and port clients use to reach the API; confirmation links are built from these.
    pub public_protocol: String,
    pub public_domain: String,
    pub public_port: u16,
    /// Poll id is appended to this after a vote is confirmed.
    pub redirect_location: String,
    pub vote_max_body_bytes: usize,
    pub cors: CorsConfig,
}

impl WebConfig {
    pub fn confirmation_url(&self, token: &str) -> String {
        let port = match self.public_port {
            80 | 443 => String::new(),
            p => format!(":{}", p),
        };
        format!(
            "{}://{}{}{}/polls/confirm_vote/{}",
            self.public_protocol, self.public_domain, port, self.api_prefix, token
        )
    }

    pub fn redirect_for_poll(&self, poll_id: i32) -> String {
        format!("{}{}", self.redirect_location, poll_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Usernames map to `{username}@{organization_domain}`.
    pub organization_domain: String,
    pub sender_email: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub subject: String,
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecaptchaConfig {
    /// `None` disables verification.
    pub secret: Option<String>,
    pub verify_endpoint: String,
    pub min_score: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub web: WebConfig,
    pub email: EmailConfig,
    pub recaptcha: RecaptchaConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let port = parse_or("APP_PORT", 8080);

        let web = WebConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            api_prefix: std::env::var("API_PREFIX").unwrap_or_else(|_| "/api".into()),
            public_protocol: std::env::var("PUBLIC_PROTOCOL").unwrap_or_else(|_| "http".into()),
            public_domain: std::env::var("PUBLIC_DOMAIN").unwrap_or_else(|_| "localhost".into()),
            public_port: parse_or("PUBLIC_PORT", port),
            redirect_location: std::env::var("VOTE_REDIRECT_LOCATION")
                .unwrap_or_else(|_| "http://localhost:3000/polls/".into()),
            vote_max_body_bytes: parse_or("VOTE_MAX_BODY_BYTES", 1024),
            cors: CorsConfig {
                allow_origin: std::env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| "*".into()),
                allow_headers: std::env::var("CORS_ALLOW_HEADERS")
                    .unwrap_or_else(|_| "content-type,g-recaptcha-response".into())
                    .split(',')
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .collect(),
            },
        };

        let email = EmailConfig {
            organization_domain: std::env::var("ORGANIZATION_DOMAIN")
                .unwrap_or_else(|_| "example.org".into()),
            sender_email: std::env::var("SENDER_EMAIL")
                .unwrap_or_else(|_| "polls@example.org".into()),
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".into()),
            smtp_port: parse_or("SMTP_PORT", 587),
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            subject: std::env::var("EMAIL_SUBJECT")
                .unwrap_or_else(|_| "[POLLS] Confirm your vote".into()),
            service_name: std::env::var("SERVICE_NAME").unwrap_or_else(|_| "POLLS".into()),
        };

        let recaptcha = RecaptchaConfig {
            secret: std::env::var("RECAPTCHA_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            verify_endpoint: std::env::var("RECAPTCHA_VERIFY_ENDPOINT")
                .unwrap_or_else(|_| "https://www.google.com/recaptcha/api/siteverify".into()),
            min_score: parse_or("RECAPTCHA_MIN_SCORE", 0.51),
        };

        Ok(Self {
            database_url,
            web,
            email,
            recaptcha,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web(public_port: u16) -> WebConfig {
        WebConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            api_prefix: "/api".into(),
            public_protocol: "https".into(),
            public_domain: "polls.example.org".into(),
            public_port,
            redirect_location: "https://polls.example.org/results/".into(),
            vote_max_body_bytes: 1024,
            cors: CorsConfig {
                allow_origin: "*".into(),
                allow_headers: vec![],
            },
        }
    }

    #[test]
    fn confirmation_url_omits_default_ports() {
        assert_eq!(
            web(443).confirmation_url("abc-123"),
            "https://polls.example.org/api/polls/confirm_vote/abc-123"
        );
        assert_eq!(
            web(80).confirmation_url("abc"),
            "https://polls.example.org/api/polls/confirm_vote/abc"
        );
    }

    #[test]
    fn confirmation_url_keeps_custom_port() {
        assert_eq!(
            web(8443).confirmation_url("t"),
            "https://polls.example.org:8443/api/polls/confirm_vote/t"
        );
    }

    #[test]
    fn redirect_appends_poll_id() {
        assert_eq!(
            web(443).redirect_for_poll(7),
            "https://polls.example.org/results/7"
        );
    }
}
