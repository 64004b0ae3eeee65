//! Settings pushed through the reload channel reach a running server.

use request_baskets::config::ServiceConfig;
use std::time::{Duration, Instant};

mod common;

#[tokio::test]
async fn test_reloaded_settings_apply_to_new_baskets() {
    let (addr, shutdown, reload) = common::start_reloadable_service(ServiceConfig::default()).await;
    let client = common::client();

    let mut updated = ServiceConfig::default();
    updated.baskets.default_capacity = 7;
    reload.send(updated).unwrap();

    // The swap happens on the server's reload task; poll until it lands.
    let deadline = Instant::now() + Duration::from_secs(3);
    let mut attempt = 0;
    let capacity = loop {
        let name = format!("reload-{}", attempt);
        let token = common::create_basket(&client, addr, &name, serde_json::json!({})).await;
        let res = client
            .get(format!("http://{}/baskets/{}", addr, name))
            .header("Authorization", token.as_str())
            .send()
            .await
            .unwrap();
        let basket: serde_json::Value = res.json().await.unwrap();
        let capacity = basket["capacity"].as_u64().unwrap();
        if capacity == 7 || Instant::now() >= deadline {
            break capacity;
        }
        attempt += 1;
        tokio::time::sleep(Duration::from_millis(25)).await;
    };
    assert_eq!(capacity, 7);

    shutdown.trigger();
}

#[tokio::test]
async fn test_reload_can_disable_forwarding() {
    let (target, received) =
        common::start_forward_target(axum::http::StatusCode::OK, Duration::ZERO).await;
    let (addr, shutdown, reload) = common::start_reloadable_service(ServiceConfig::default()).await;
    let client = common::client();

    common::create_basket(
        &client,
        addr,
        "muted",
        serde_json::json!({ "forwardUrl": format!("http://{}/hook", target) }),
    )
    .await;

    client.post(format!("http://{}/muted", addr)).send().await.unwrap();
    assert_eq!(common::wait_for(&received, 1, Duration::from_secs(3)).await.len(), 1);

    let mut updated = ServiceConfig::default();
    updated.forwarding.enabled = false;
    reload.send(updated).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let res = client.post(format!("http://{}/muted", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(received.lock().unwrap().len(), 1);

    shutdown.trigger();
}
