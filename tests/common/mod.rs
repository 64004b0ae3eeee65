//! Shared utilities for integration and load testing.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::any,
    Router,
};
use request_baskets::config::ServiceConfig;
use request_baskets::http::HttpServer;
use request_baskets::lifecycle::Shutdown;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A request seen by the mock forward target.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Received {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct TargetState {
    status: StatusCode,
    delay: Duration,
    received: Arc<Mutex<Vec<Received>>>,
}

/// Start a mock forward target that records what it receives.
#[allow(dead_code)]
pub async fn start_forward_target(
    status: StatusCode,
    delay: Duration,
) -> (SocketAddr, Arc<Mutex<Vec<Received>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = TargetState {
        status,
        delay,
        received: received.clone(),
    };

    async fn record(
        State(state): State<TargetState>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        tokio::time::sleep(state.delay).await;
        state.received.lock().unwrap().push(Received {
            method,
            uri: uri.to_string(),
            headers,
            body: body.to_vec(),
        });
        state.status
    }

    let app = Router::new()
        .route("/", any(record))
        .route("/{*path}", any(record))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, received)
}

/// Start the basket service on an ephemeral port.
#[allow(dead_code)]
pub async fn start_service(config: ServiceConfig) -> (SocketAddr, Shutdown) {
    let (addr, shutdown, _) = start_reloadable_service(config).await;
    (addr, shutdown)
}

/// Like `start_service`, also returning the sender that feeds config reloads.
pub async fn start_reloadable_service(
    config: ServiceConfig,
) -> (SocketAddr, Shutdown, mpsc::UnboundedSender<ServiceConfig>) {
    let shutdown = Shutdown::new();
    let (reload_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });
    (addr, shutdown, reload_tx)
}

/// Create a basket and return its token.
pub async fn create_basket(
    client: &reqwest::Client,
    addr: SocketAddr,
    name: &str,
    body: serde_json::Value,
) -> String {
    let res = client
        .post(format!("http://{}/baskets/{}", addr, name))
        .json(&body)
        .send()
        .await
        .expect("service unreachable");
    assert_eq!(res.status(), 201, "create {}", name);
    let json: serde_json::Value = res.json().await.unwrap();
    json["token"].as_str().unwrap().to_string()
}

/// Poll until `received` holds at least `count` entries or the deadline passes.
#[allow(dead_code)]
pub async fn wait_for(
    received: &Arc<Mutex<Vec<Received>>>,
    count: usize,
    deadline: Duration,
) -> Vec<Received> {
    let start = std::time::Instant::now();
    loop {
        {
            let seen = received.lock().unwrap();
            if seen.len() >= count || start.elapsed() >= deadline {
                return seen.clone();
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
