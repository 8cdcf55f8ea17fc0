use std::net::SocketAddr;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::CorsConfig;
use crate::state::AppState;
use crate::{polls, votes};

pub fn build_app(state: AppState) -> Router {
    let web = &state.config.web;
    let api = Router::new()
        .merge(polls::router())
        .merge(votes::router(web.vote_max_body_bytes))
        .route("/health", get(|| async { "ok" }));

    let prefix = web.api_prefix.trim_matches('/');
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&format!("/{}", prefix), api)
    };

    let cors = cors_layer(&web.cors);
    router
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let origin = if cfg.allow_origin == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(&cfg.allow_origin) {
            Ok(v) => AllowOrigin::exact(v),
            Err(e) => {
                warn!(error = %e, origin = %cfg.allow_origin, "invalid CORS origin; allowing any");
                AllowOrigin::any()
            }
        }
    };
    let headers: Vec<HeaderName> = cfg
        .allow_headers
        .iter()
        .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(headers)
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
