//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the basket API and the capture fallback
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener and serve until shutdown
//! - Apply hot-reloaded settings

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::Request,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::basket::{BasketRegistry, Forwarder};
use crate::config::{ServiceConfig, ServiceSettings};
use crate::http::handlers::*;
use crate::http::request::{request_id, UuidRequestId};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<BasketRegistry>,
    pub forwarder: Forwarder,
    pub settings: Arc<ArcSwap<ServiceSettings>>,
}

impl AppState {
    pub fn new(settings: ServiceSettings) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(settings));
        Self {
            registry: Arc::new(BasketRegistry::new()),
            forwarder: Forwarder::new(settings.clone()),
            settings,
        }
    }
}

/// HTTP server for the basket service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let state = AppState::new(config.settings());
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/baskets", get(list_baskets))
            .route(
                "/baskets/{name}",
                get(get_basket)
                    .post(create_basket)
                    .put(update_basket)
                    .delete(delete_basket),
            )
            .route(
                "/baskets/{name}/requests",
                get(get_requests).delete(clear_requests),
            )
            .route("/health", get(get_health))
            .fallback(capture_request)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Shared state, e.g. to inspect the registry.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Settings from `config_updates` replace the basket and forwarding
    /// settings in place. Returns once `shutdown` fires and in-flight
    /// requests are drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let settings = self.state.settings.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                settings.store(Arc::new(new_config.settings()));
                tracing::info!(
                    default_capacity = new_config.baskets.default_capacity,
                    forwarding = new_config.forwarding.enabled,
                    "Settings reloaded"
                );
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
