//! HTTP API server for the bot

pub mod health;
pub mod webhooks;

use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::activation::ActivationPolicy;
use crate::channels::{Channel, UpdateDedup};
use crate::config::ReplyTexts;
use crate::orchestrator::Responder;

/// Shared state for API handlers
pub struct ApiState {
    /// Outbound messaging collaborator
    pub channel: Arc<dyn Channel>,
    /// Engagement policy for the bot's identity
    pub policy: ActivationPolicy,
    /// Completion orchestrator owning the context store
    pub responder: Responder,
    /// Fixed reply texts
    pub replies: ReplyTexts,
    /// Expected webhook secret token, if any
    pub webhook_secret: Option<String>,
    /// Recently seen update ids
    pub telegram_dedup: Mutex<UpdateDedup>,
}

impl ApiState {
    /// Create handler state with default replies and no webhook secret
    #[must_use]
    pub fn new(channel: Arc<dyn Channel>, policy: ActivationPolicy, responder: Responder) -> Self {
        Self {
            channel,
            policy,
            responder,
            replies: ReplyTexts::default(),
            webhook_secret: None,
            telegram_dedup: Mutex::new(UpdateDedup::default()),
        }
    }

    /// Record an update id, returning `true` if it was already handled
    pub fn is_duplicate_update(&self, update_id: i64) -> bool {
        self.telegram_dedup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_duplicate(update_id)
    }
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    state: ApiState,
    port: u16,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(
        channel: Arc<dyn Channel>,
        policy: ActivationPolicy,
        responder: Responder,
        port: u16,
    ) -> Self {
        Self {
            state: ApiState::new(channel, policy, responder),
            port,
        }
    }

    /// Set the fixed reply texts
    #[must_use]
    pub fn replies(mut self, replies: ReplyTexts) -> Self {
        self.state.replies = replies;
        self
    }

    /// Require Telegram to echo this secret token on every webhook call
    #[must_use]
    pub fn webhook_secret(mut self, secret: Option<String>) -> Self {
        self.state.webhook_secret = secret;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        ApiServer {
            state: Arc::new(self.state),
            port: self.port,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Build the router with all routes
    pub fn router(&self) -> Router {
        Router::new()
            .nest("/api/webhooks", webhooks::router(self.state.clone()))
            .merge(health::router())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server until shutdown is signalled
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
