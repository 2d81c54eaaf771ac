//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use edge_failover::config::FailoverConfig;
use edge_failover::lifecycle::{build_server, Shutdown};

/// Parsed request line and headers of a mock-served request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

async fn read_request(socket: &mut TcpStream) -> MockRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.split("\r\n");
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    MockRequest { path, headers }
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        401 => "401 Unauthorized",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a mock HTTP server whose response is computed from each request.
pub async fn start_programmable_backend<F>(addr: SocketAddr, f: F)
where
    F: Fn(&MockRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let (status, body) = f(&request);
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a backend answering `"{name}|{host header}|{path}"`.
pub async fn start_echo_backend(addr: SocketAddr, name: &'static str) {
    start_programmable_backend(addr, move |req| {
        let host = req.header("host").unwrap_or("").to_string();
        (200, format!("{}|{}|{}", name, host, req.path))
    })
    .await;
}

/// Status service answers keyed by health-check id.
#[derive(Clone, Default)]
pub struct StatusScript {
    answers: Arc<Mutex<Vec<(String, u16, String)>>>,
    calls: Arc<Mutex<Vec<String>>>,
    total: Arc<AtomicUsize>,
}

impl StatusScript {
    pub fn set(&self, id: &str, status: u16, body: String) {
        let mut answers = self.answers.lock().unwrap();
        answers.retain(|(k, _, _)| k != id);
        answers.push((id.to_string(), status, body));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// JSON health report with one observation per status.
pub fn report(statuses: &[&str]) -> String {
    let observations: Vec<serde_json::Value> = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| {
            serde_json::json!({
                "Region": format!("region-{}", i),
                "IPAddress": format!("10.0.0.{}", i),
                "StatusReport": { "Status": s, "CheckedTime": "2024-05-02T10:41:09Z" }
            })
        })
        .collect();
    serde_json::json!({ "HealthCheckObservations": observations }).to_string()
}

/// Start a mock status service serving `/2013-04-01/healthcheck/{id}/status`.
pub async fn start_status_service(addr: SocketAddr, script: StatusScript) {
    start_programmable_backend(addr, move |req| {
        script.total.fetch_add(1, Ordering::SeqCst);
        let id = req
            .path
            .strip_prefix("/2013-04-01/healthcheck/")
            .and_then(|rest| rest.strip_suffix("/status"))
            .unwrap_or("")
            .to_string();
        script.calls.lock().unwrap().push(id.clone());

        let answer = script
            .answers
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _, _)| *k == id)
            .map(|(_, status, body)| (*status, body.clone()));
        answer.unwrap_or((404, "{}".to_string()))
    })
    .await;
}

/// Config pointing at local mocks.
pub fn test_config(proxy: SocketAddr, status: SocketAddr, primary: SocketAddr, secondary: SocketAddr) -> FailoverConfig {
    let mut config = FailoverConfig::default();
    config.listener.bind_address = proxy.to_string();
    config.primary.host = primary.to_string();
    config.primary.health_check_id = "hc-primary".to_string();
    config.secondary.host = secondary.to_string();
    config.secondary.health_check_id = "hc-secondary".to_string();
    config.health_source.base_url = format!("http://{}", status);
    config.health_source.timeout_secs = 2;
    config.observability.metrics_enabled = false;
    config
}

/// Start the router and return its shutdown handle.
pub async fn start_router(config: FailoverConfig) -> Shutdown {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let server = build_server(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
