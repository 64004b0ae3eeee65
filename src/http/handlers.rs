//! Basket REST handlers and the capture fallback.

use axum::{
    body::Body,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::basket::{self, Basket, BasketConfig, RequestRecord};
use crate::basket::config::validate_name;
use crate::error::{BasketError, BasketResult};
use crate::http::request::{provided_token, read_limited, request_id, PageParams};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Serialize)]
pub struct ServiceStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub baskets: usize,
}

pub async fn get_health(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        baskets: state.registry.len(),
    })
}

/// Resolve a basket and check the caller's token.
fn authorize(state: &AppState, name: &str, headers: &HeaderMap) -> BasketResult<Arc<Basket>> {
    let basket = state.registry.get(name)?;
    if basket.authenticate(provided_token(headers)) {
        Ok(basket)
    } else {
        metrics::record_auth_failure();
        tracing::warn!(basket = %name, request_id = %request_id(headers), "Basket token mismatch");
        Err(BasketError::Unauthorized)
    }
}

/// Read and parse a create/update body within the configured size limit.
async fn read_config(state: &AppState, body: Body) -> BasketResult<Option<BasketConfig>> {
    let settings = state.settings.load_full();
    let limit = settings.baskets.config_body_limit;
    let bytes = axum::body::to_bytes(body, limit).await.map_err(|_| {
        BasketError::Validation(format!("basket config must not exceed {} bytes", limit))
    })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    BasketConfig::from_body(&bytes, &settings.baskets).map(Some)
}

pub async fn list_baskets(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let page = params.page(state.settings.load().baskets.page_size);
    Json(state.registry.list(page))
}

pub async fn create_basket(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Body,
) -> BasketResult<Response> {
    validate_name(&name)?;
    let config = match read_config(&state, body).await? {
        Some(config) => config,
        None => BasketConfig::with_defaults(&state.settings.load().baskets),
    };

    let basket = state.registry.create(&name, config)?;
    tracing::info!(
        basket = %name,
        capacity = basket.requests().capacity(),
        forward_url = ?basket.forward_url(),
        "Basket created"
    );
    Ok((StatusCode::CREATED, Json(basket.to_auth_view())).into_response())
}

pub async fn get_basket(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> BasketResult<Response> {
    let basket = authorize(&state, &name, &headers)?;
    Ok(Json(basket.to_public_view()).into_response())
}

pub async fn update_basket(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> BasketResult<StatusCode> {
    let basket = authorize(&state, &name, &headers)?;
    if let Some(config) = read_config(&state, body).await? {
        tracing::info!(
            basket = %name,
            forward_url = ?config.forward_url,
            capacity = config.capacity,
            "Basket config updated"
        );
        basket.update_config(config);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_basket(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> BasketResult<StatusCode> {
    authorize(&state, &name, &headers)?;
    state.registry.delete(&name)?;
    tracing::info!(basket = %name, "Basket deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_requests(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> BasketResult<Response> {
    let basket = authorize(&state, &name, &headers)?;
    let page = params.page(state.settings.load().baskets.page_size);
    Ok(Json(basket.requests().page(page)).into_response())
}

pub async fn clear_requests(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> BasketResult<StatusCode> {
    let basket = authorize(&state, &name, &headers)?;
    basket.requests().clear();
    tracing::info!(basket = %name, "Basket requests cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Capture any request that is not part of the REST API.
///
/// The first path segment names the basket.
pub async fn capture_request(State(state): State<AppState>, request: Request<Body>) -> Response {
    let name = basket_name(request.uri().path()).to_string();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 0)));

    tracing::debug!(
        basket = %name,
        method = %request.method(),
        request_id = %request_id(request.headers()),
        "Capturing request"
    );

    let limit = state.settings.load().baskets.max_capture_body_bytes;
    let (parts, body) = request.into_parts();
    let (bytes, received) = match read_limited(body, limit).await {
        Ok(read) => read,
        Err(e) => {
            tracing::warn!(basket = %name, error = %e, "Failed to read capture body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let record = RequestRecord::capture(&parts, &bytes, received, remote);
    match basket::capture(&state.registry, &state.forwarder, &name, record) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}

/// First segment of a request path.
fn basket_name(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or_default()
}
