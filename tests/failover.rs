//! End-to-end failover behaviour over real sockets.

use std::net::SocketAddr;

mod common;

use common::{report, StatusScript};

struct Ports {
    proxy: SocketAddr,
    status: SocketAddr,
    primary: SocketAddr,
    secondary: SocketAddr,
}

fn ports(base: u16) -> Ports {
    let addr = |offset: u16| -> SocketAddr { format!("127.0.0.1:{}", base + offset).parse().unwrap() };
    Ports {
        proxy: addr(0),
        status: addr(1),
        primary: addr(2),
        secondary: addr(3),
    }
}

#[tokio::test]
async fn test_primary_healthy_routes_to_primary() {
    let p = ports(28410);
    let script = StatusScript::default();
    script.set("hc-primary", 200, report(&["Success: HTTP Status Code 200", "Success", "Failure: timeout"]));
    script.set("hc-secondary", 200, report(&["Success"]));
    common::start_status_service(p.status, script.clone()).await;
    common::start_echo_backend(p.primary, "primary").await;
    common::start_echo_backend(p.secondary, "secondary").await;

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let res = common::client()
        .get(format!("http://{}/orders/42?expand=true", p.proxy))
        .send()
        .await
        .expect("Router unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.text().await.unwrap(),
        format!("primary|{}|/orders/42?expand=true", p.primary)
    );
    assert_eq!(script.calls(), vec!["hc-primary"], "secondary must not be queried");

    shutdown.trigger();
}

#[tokio::test]
async fn test_primary_unhealthy_routes_to_secondary() {
    let p = ports(28420);
    let script = StatusScript::default();
    script.set("hc-primary", 200, report(&["Success", "Failure", "Failure"]));
    script.set("hc-secondary", 200, report(&["Success", "Success"]));
    common::start_status_service(p.status, script.clone()).await;
    common::start_echo_backend(p.primary, "primary").await;
    common::start_echo_backend(p.secondary, "secondary").await;

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let res = common::client().get(format!("http://{}/", p.proxy)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), format!("secondary|{}|/", p.secondary));
    assert_eq!(script.calls(), vec!["hc-primary", "hc-secondary"]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_primary_status_error_routes_to_secondary() {
    let p = ports(28430);
    let script = StatusScript::default();
    script.set("hc-primary", 500, "{\"message\":\"throttled\"}".to_string());
    script.set("hc-secondary", 200, report(&["Success"]));
    common::start_status_service(p.status, script.clone()).await;
    common::start_echo_backend(p.primary, "primary").await;
    common::start_echo_backend(p.secondary, "secondary").await;

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let res = common::client().get(format!("http://{}/a", p.proxy)).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), format!("secondary|{}|/a", p.secondary));

    shutdown.trigger();
}

#[tokio::test]
async fn test_both_failing_returns_fixed_404() {
    let p = ports(28440);
    let script = StatusScript::default();
    script.set("hc-primary", 500, "{}".to_string());
    script.set("hc-secondary", 200, "not json".to_string());
    common::start_status_service(p.status, script.clone()).await;
    common::start_echo_backend(p.primary, "primary").await;
    common::start_echo_backend(p.secondary, "secondary").await;

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let res = common::client().get(format!("http://{}/", p.proxy)).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "Nope - generated by Lambda@Edge function.");
    assert_eq!(script.calls(), vec!["hc-primary", "hc-secondary"]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_status_service_down_returns_fixed_404() {
    let p = ports(28450);
    // Nothing listens on the status port.
    common::start_echo_backend(p.primary, "primary").await;
    common::start_echo_backend(p.secondary, "secondary").await;

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let res = common::client().get(format!("http://{}/", p.proxy)).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "Nope - generated by Lambda@Edge function.");

    shutdown.trigger();
}

#[tokio::test]
async fn test_repeated_requests_route_identically() {
    let p = ports(28460);
    let script = StatusScript::default();
    script.set("hc-primary", 200, report(&["Success", "Failure"]));
    script.set("hc-secondary", 200, report(&["Failure", "Failure"]));
    common::start_status_service(p.status, script.clone()).await;
    common::start_echo_backend(p.primary, "primary").await;
    common::start_echo_backend(p.secondary, "secondary").await;

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let client = common::client();
    let first = client.get(format!("http://{}/x", p.proxy)).send().await.unwrap().text().await.unwrap();
    let second = client.get(format!("http://{}/x", p.proxy)).send().await.unwrap().text().await.unwrap();

    // All-failed secondary still counts as healthy.
    assert_eq!(first, format!("secondary|{}|/x", p.secondary));
    assert_eq!(first, second);
    assert_eq!(script.total(), 4, "every request queries fresh, nothing is cached");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_returns_502() {
    let p = ports(28470);
    let script = StatusScript::default();
    script.set("hc-primary", 200, report(&["Success"]));
    common::start_status_service(p.status, script.clone()).await;
    // No backend on the primary port.

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let res = common::client().get(format!("http://{}/", p.proxy)).send().await.unwrap();
    assert_eq!(res.status(), 502);
    assert_eq!(script.calls(), vec!["hc-primary"], "forwarding failures do not trigger failover");

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let p = ports(28480);
    let script = StatusScript::default();
    script.set("hc-primary", 200, report(&["Success"]));
    common::start_status_service(p.status, script).await;
    common::start_echo_backend(p.primary, "primary").await;

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let res = common::client()
        .get(format!("http://{}/", p.proxy))
        .header("x-request-id", "req-abc")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-abc");

    let res = common::client().get(format!("http://{}/", p.proxy)).send().await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_report_without_observations_routes_to_secondary() {
    let p = ports(28490);
    let script = StatusScript::default();
    script.set("hc-primary", 200, "{}".to_string());
    script.set("hc-secondary", 200, report(&["Success"]));
    common::start_status_service(p.status, script.clone()).await;
    common::start_echo_backend(p.primary, "primary").await;
    common::start_echo_backend(p.secondary, "secondary").await;

    let shutdown = common::start_router(common::test_config(p.proxy, p.status, p.primary, p.secondary)).await;

    let res = common::client().get(format!("http://{}/", p.proxy)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), format!("secondary|{}|/", p.secondary));
    assert_eq!(script.calls(), vec!["hc-primary", "hc-secondary"]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_chunked_body_returns_413() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let p = ports(28500);
    let script = StatusScript::default();
    script.set("hc-primary", 200, report(&["Success"]));
    common::start_status_service(p.status, script.clone()).await;
    common::start_echo_backend(p.primary, "primary").await;

    let mut config = common::test_config(p.proxy, p.status, p.primary, p.secondary);
    config.listener.max_body_size = 16;
    let shutdown = common::start_router(config).await;

    let mut stream = tokio::net::TcpStream::connect(p.proxy).await.unwrap();
    let chunk = "x".repeat(64);
    let request = format!(
        "POST /upload HTTP/1.1\r\nHost: edge.example.com\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n{:x}\r\n{}\r\n0\r\n\r\n",
        chunk.len(),
        chunk
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response).await;
    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 413"), "got {response}");
    assert!(script.calls().is_empty(), "oversized bodies are rejected before any health query");

    shutdown.trigger();
}
