#![cfg(unix)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cortex::BridgeConfig;
use cortex_screenshot_server::{build_router, http_dispatcher};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::Path;

const PNG_STUB: [u8; 10] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x01];

fn config_with_command(root: &Path, command: &[&str]) -> BridgeConfig {
    BridgeConfig {
        screenshot_command: command.iter().map(|s| s.to_string()).collect(),
        screenshot_dir: root.join("shots"),
        activity_log_dir: root.join("logs"),
        ..BridgeConfig::default()
    }
}

async fn spawn_server(config: BridgeConfig) -> SocketAddr {
    let app = build_router(http_dispatcher(config).unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn get(addr: SocketAddr, path: &str) -> reqwest::Response {
    reqwest::Client::new()
        .get(format!("http://{addr}{path}"))
        .header("Origin", "http://simulator.local")
        .send()
        .await
        .unwrap()
}

fn allow_origin(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|value| value.to_str().ok())
}

#[tokio::test]
async fn test_screenshot_returns_stub_bytes() {
    let root = tempfile::tempdir().unwrap();
    let stub_path = root.path().join("stub.png");
    std::fs::write(&stub_path, PNG_STUB).unwrap();
    let addr = spawn_server(config_with_command(
        root.path(),
        &["cp", stub_path.to_str().unwrap(), "{path}"],
    ))
    .await;

    let response = get(addr, "/screenshot").await;
    assert_eq!(response.status(), 200);
    assert_eq!(allow_origin(&response), Some("*"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let image = STANDARD.decode(body["image"].as_str().unwrap()).unwrap();
    assert_eq!(image, PNG_STUB);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_screenshot_failure_is_500_json() {
    let root = tempfile::tempdir().unwrap();
    let addr = spawn_server(config_with_command(
        root.path(),
        &["sh", "-c", "echo 'Invalid device: booted' >&2; exit 148"],
    ))
    .await;

    let response = get(addr, "/screenshot").await;
    assert_eq!(response.status(), 500);
    assert_eq!(allow_origin(&response), Some("*"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Invalid device: booted"));
}

#[tokio::test]
async fn test_health_and_hello() {
    let root = tempfile::tempdir().unwrap();
    let addr = spawn_server(config_with_command(root.path(), &["true", "{path}"])).await;

    let health = get(addr, "/health").await;
    assert_eq!(health.status(), 200);
    let body: Value = health.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["server"], "mac_screenshot_server");

    let hello = get(addr, "/hello").await;
    assert_eq!(hello.status(), 200);
    let body: Value = hello.json().await.unwrap();
    assert_eq!(body["message"], "Hello from Mac!");
}

#[tokio::test]
async fn test_unknown_path_is_404_with_cors() {
    let root = tempfile::tempdir().unwrap();
    let addr = spawn_server(config_with_command(root.path(), &["true", "{path}"])).await;

    for path in ["/", "/screenshots", "/health/extra"] {
        let response = get(addr, path).await;
        assert_eq!(response.status(), 404, "{path}");
        assert_eq!(allow_origin(&response), Some("*"), "{path}");
    }
}
