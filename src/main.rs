mod app;
mod captcha;
mod config;
mod confirmations;
mod db;
mod error;
mod mailer;
mod polls;
mod state;
mod users;
mod votes;

#[cfg(test)]
mod testing;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "polls_backend=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let db = db::connect(&config.database_url).await?;
    db::migrate(&db).await?;

    let (host, port) = (config.web.host.clone(), config.web.port);
    let app = app::build_app(AppState::init(config, db)?);
    app::serve(app, &host, port).await
}
