//! HTTP server for webhook mode
//!
//! Serves the bot's receive path and a catch-all health route.

use anyhow::Result;
use axum::{
    routing::{any, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::WebhookTarget;
use crate::ingress::Dispatcher;
use crate::server::telegram::{health_check, webhook_handler};

pub struct Server {
    target: WebhookTarget,
    dispatcher: Arc<Dispatcher>,
}

pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl Server {
    pub fn new(target: WebhookTarget, dispatcher: Arc<Dispatcher>) -> Self {
        Self { target, dispatcher }
    }

    pub fn target(&self) -> &WebhookTarget {
        &self.target
    }

    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            dispatcher: Arc::clone(&self.dispatcher),
        });

        Router::new()
            .route(&self.target.path, post(webhook_handler))
            .route("/", any(health_check))
            .fallback(health_check)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.target.bind, self.target.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on http://{}", addr);

        self.serve(listener, cancel).await
    }

    pub async fn serve(&self, listener: TcpListener, cancel: CancellationToken) -> Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
