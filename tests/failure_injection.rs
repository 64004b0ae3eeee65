//! Forwarding behaviour against healthy, failing, slow and missing targets.

use axum::http::StatusCode;
use request_baskets::config::ServiceConfig;
use std::time::{Duration, Instant};

mod common;

fn config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.forwarding.timeout_secs = 1;
    config
}

#[tokio::test]
async fn test_forward_relays_request_without_token() {
    let (target, received) = common::start_forward_target(StatusCode::OK, Duration::ZERO).await;
    let (addr, shutdown) = common::start_service(config()).await;
    let client = common::client();

    let token = common::create_basket(
        &client,
        addr,
        "relay",
        serde_json::json!({ "forwardUrl": format!("http://{}/hook?src=basket", target) }),
    )
    .await;

    let res = client
        .post(format!("http://{}/relay/events?id=7", addr))
        .header("Authorization", token.as_str())
        .header("X-Event", "created")
        .body("payload")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let seen = common::wait_for(&received, 1, Duration::from_secs(3)).await;
    assert_eq!(seen.len(), 1, "target should receive one forward");
    let forwarded = &seen[0];
    assert_eq!(forwarded.method, "POST");
    assert_eq!(forwarded.uri, "/hook?src=basket&id=7");
    assert_eq!(forwarded.body, b"payload");
    assert_eq!(forwarded.headers.get("x-event").unwrap(), "created");
    assert!(forwarded.headers.get("authorization").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_forward_relays_binary_body_unchanged() {
    let (target, received) = common::start_forward_target(StatusCode::OK, Duration::ZERO).await;
    let (addr, shutdown) = common::start_service(config()).await;
    let client = common::client();

    let token = common::create_basket(
        &client,
        addr,
        "gzip",
        serde_json::json!({ "forwardUrl": format!("http://{}/hook", target) }),
    )
    .await;

    // Gzip magic followed by bytes that are not valid UTF-8.
    let payload: Vec<u8> = vec![0x1f, 0x8b, 0x08, 0x00, 0xff, 0xfe, 0x80, 0x00];
    let res = client
        .post(format!("http://{}/gzip", addr))
        .header("Content-Type", "application/octet-stream")
        .body(payload.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let seen = common::wait_for(&received, 1, Duration::from_secs(3)).await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].body, payload);
    assert_eq!(seen[0].headers.get("content-length").unwrap(), "8");

    let res = client
        .get(format!("http://{}/baskets/gzip/requests", addr))
        .header("Authorization", token.as_str())
        .send()
        .await
        .unwrap();
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["requests"][0]["content_length"], 8);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_forward_target_does_not_affect_capture() {
    let (addr, shutdown) = common::start_service(config()).await;
    let client = common::client();

    // Nothing listens on port 9 locally.
    let token = common::create_basket(
        &client,
        addr,
        "lost",
        serde_json::json!({ "forwardUrl": "http://127.0.0.1:9/hook" }),
    )
    .await;

    let res = client.get(format!("http://{}/lost/ping", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("http://{}/baskets/lost/requests", addr))
        .header("Authorization", token.as_str())
        .send()
        .await
        .unwrap();
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["count"], 1);
    assert_eq!(page["requests"][0]["path"], "/lost/ping");

    shutdown.trigger();
}

#[tokio::test]
async fn test_failing_target_is_contained() {
    let (target, received) =
        common::start_forward_target(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
    let (addr, shutdown) = common::start_service(config()).await;
    let client = common::client();

    common::create_basket(
        &client,
        addr,
        "flaky",
        serde_json::json!({ "forwardUrl": format!("http://{}/", target) }),
    )
    .await;

    for _ in 0..3 {
        let res = client.put(format!("http://{}/flaky", addr)).body("x").send().await.unwrap();
        assert_eq!(res.status(), 200);
    }

    // Fire-once: three captures, three forwards, no retries.
    let seen = common::wait_for(&received, 3, Duration::from_secs(3)).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(seen.len(), 3);
    assert_eq!(received.lock().unwrap().len(), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_slow_target_does_not_stall_capture() {
    let (target, _received) =
        common::start_forward_target(StatusCode::OK, Duration::from_secs(10)).await;
    let (addr, shutdown) = common::start_service(config()).await;
    let client = common::client();

    let token = common::create_basket(
        &client,
        addr,
        "slow",
        serde_json::json!({ "forwardUrl": format!("http://{}/", target), "capacity": 50 }),
    )
    .await;

    let start = Instant::now();
    for i in 0..5 {
        let res = client
            .post(format!("http://{}/slow/{}", addr, i))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "captures waited on forwarding: {:?}",
        start.elapsed()
    );

    let res = client
        .get(format!("http://{}/baskets/slow/requests", addr))
        .header("Authorization", token.as_str())
        .send()
        .await
        .unwrap();
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["count"], 5);

    shutdown.trigger();
}

#[tokio::test]
async fn test_deleted_basket_stops_capturing() {
    let (addr, shutdown) = common::start_service(config()).await;
    let client = common::client();
    let token = common::create_basket(&client, addr, "gone", serde_json::json!({})).await;

    let res = client
        .delete(format!("http://{}/baskets/gone", addr))
        .header("Authorization", token.as_str())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client.post(format!("http://{}/gone/hook", addr)).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let res = client
        .get(format!("http://{}/baskets/gone", addr))
        .header("Authorization", token.as_str())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}
