//! HTTP surface of the board.
//!
//! One shared classifier, one registry of per-session stores, and a router
//! that re-renders the whole page on every interaction.

mod cookie;
mod handlers;
mod request_context;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sentiment_board::{PageSettings, SentimentClassifier, SessionRegistry};

/// Runtime settings for `serve`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
    pub page: PageSettings,
}

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn SentimentClassifier>,
    pub sessions: Arc<SessionRegistry>,
    pub page: Arc<PageSettings>,
}

impl AppState {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        sessions: SessionRegistry,
        page: PageSettings,
    ) -> Self {
        Self {
            classifier,
            sessions: Arc::new(sessions),
            page: Arc::new(page),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/comments", post(handlers::submit_comment))
        .route("/api/comments", get(handlers::api_comments))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(middleware::from_fn(request_context::request_context_middleware))
}

/// Periodically drop idle sessions (and with them their comments).
fn spawn_session_sweeper(sessions: Arc<SessionRegistry>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = sessions.evict_idle(Instant::now());
            if removed > 0 {
                tracing::info!(removed, live = sessions.len(), "evicted idle sessions");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

/// Bind and serve until Ctrl-C.
pub async fn run(config: ServerConfig, classifier: Arc<dyn SentimentClassifier>) -> Result<()> {
    let state = AppState::new(
        classifier,
        SessionRegistry::new(config.session_ttl),
        config.page.clone(),
    );
    spawn_session_sweeper(Arc::clone(&state.sessions), config.sweep_interval);

    let app = create_router(state);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(
        addr = %addr,
        session_ttl_secs = config.session_ttl.as_secs(),
        "Sentiment board listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    Ok(())
}
