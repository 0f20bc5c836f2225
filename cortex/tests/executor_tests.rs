//! Runs the executor against small shell commands standing in for the real
//! capture and alert tools.
#![cfg(unix)]

mod common;

use common::{strings, test_config};
use cortex::actions::decode_image;
use cortex::{
    ActionKind, ActionRegistry, ActionRequest, BridgeConfig, Dispatcher, ErrorKind, Executor,
    Params,
};
use serde_json::json;
use std::path::Path;
use std::time::{Duration, Instant};

fn dispatcher(config: BridgeConfig, kinds: &[ActionKind]) -> Dispatcher {
    let registry = ActionRegistry::new(&config, kinds).unwrap();
    Dispatcher::new(registry, Executor::new(config))
}

fn dir_is_empty(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

fn process_alive(pid: &str) -> bool {
    std::process::Command::new("kill")
        .args(["-0", pid])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn is_zombie(pid: &str) -> bool {
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .map(|stat| {
            stat.rsplit(')')
                .next()
                .map(|rest| rest.trim_start().starts_with('Z'))
                .unwrap_or(false)
        })
        .unwrap_or(false)
}

#[tokio::test]
async fn test_capture_returns_written_bytes_and_removes_temp_file() {
    let root = tempfile::tempdir().unwrap();
    let stub: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let stub_path = root.path().join("stub.png");
    std::fs::write(&stub_path, &stub).unwrap();

    let config = BridgeConfig {
        screenshot_command: strings(&["cp", stub_path.to_str().unwrap(), "{path}"]),
        ..test_config(root.path())
    };
    let shots_dir = config.screenshot_dir.clone();
    let dispatcher = dispatcher(config, &[ActionKind::CaptureScreenshot]);

    let result = dispatcher
        .dispatch(ActionRequest::without_params("capture_screenshot"))
        .await;

    let payload = result.payload().expect("capture should succeed");
    let decoded = decode_image(payload["image"].as_str().unwrap()).unwrap();
    assert_eq!(decoded.len(), stub.len());
    assert_eq!(decoded, stub);
    assert_eq!(payload["bytes"], json!(stub.len()));
    let timestamp = payload["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(dir_is_empty(&shots_dir), "temporary screenshot left behind");
}

#[tokio::test]
async fn test_capture_non_zero_exit_reports_stderr() {
    let root = tempfile::tempdir().unwrap();
    let config = BridgeConfig {
        screenshot_command: strings(&[
            "sh",
            "-c",
            "echo 'No devices are booted.' >&2; exit 2",
        ]),
        ..test_config(root.path())
    };
    let dispatcher = dispatcher(config, &[ActionKind::CaptureScreenshot]);

    let result = dispatcher
        .dispatch(ActionRequest::without_params("capture_screenshot"))
        .await;

    let failure = result.failure().expect("capture should fail");
    assert_eq!(failure.kind, ErrorKind::ExternalCommandFailed);
    assert!(failure.detail.contains("No devices are booted."));
}

#[tokio::test]
async fn test_capture_without_output_file_is_encoding_error() {
    let root = tempfile::tempdir().unwrap();
    let config = BridgeConfig {
        screenshot_command: strings(&["true", "{path}"]),
        ..test_config(root.path())
    };
    let dispatcher = dispatcher(config, &[ActionKind::CaptureScreenshot]);

    let result = dispatcher
        .dispatch(ActionRequest::without_params("capture_screenshot"))
        .await;

    assert_eq!(
        result.failure().map(|f| f.kind),
        Some(ErrorKind::EncodingError)
    );
}

#[tokio::test]
async fn test_missing_capture_tool_is_command_failed() {
    let root = tempfile::tempdir().unwrap();
    let config = BridgeConfig {
        screenshot_command: strings(&["cortex-no-such-capture-tool", "{path}"]),
        ..test_config(root.path())
    };
    let dispatcher = dispatcher(config, &[ActionKind::CaptureScreenshot]);

    let result = dispatcher
        .dispatch(ActionRequest::without_params("capture_screenshot"))
        .await;

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::ExternalCommandFailed);
    assert!(failure.detail.contains("cortex-no-such-capture-tool"));
}

#[tokio::test]
async fn test_capture_timeout_terminates_process() {
    let root = tempfile::tempdir().unwrap();
    let pid_file = root.path().join("capture.pid");
    let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());
    let config = BridgeConfig {
        screenshot_command: strings(&["sh", "-c", &script]),
        screenshot_timeout_secs: 1,
        ..test_config(root.path())
    };
    let shots_dir = config.screenshot_dir.clone();
    let dispatcher = dispatcher(config, &[ActionKind::CaptureScreenshot]);

    let started = Instant::now();
    let result = dispatcher
        .dispatch(ActionRequest::without_params("capture_screenshot"))
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(result.failure().map(|f| f.kind), Some(ErrorKind::Timeout));
    let pid = std::fs::read_to_string(&pid_file).unwrap();
    assert!(!process_alive(pid.trim()), "capture process still running");
    assert!(dir_is_empty(&shots_dir));
}

#[tokio::test]
async fn test_capture_with_lingering_child_stays_within_timeout() {
    let root = tempfile::tempdir().unwrap();
    let stub_path = root.path().join("stub.png");
    std::fs::write(&stub_path, b"\x89PNG-lingering").unwrap();
    let script = format!("cp '{}' \"$0\"; sleep 30 &", stub_path.display());
    let config = BridgeConfig {
        screenshot_command: strings(&["sh", "-c", &script, "{path}"]),
        screenshot_timeout_secs: 2,
        ..test_config(root.path())
    };
    let dispatcher = dispatcher(config, &[ActionKind::CaptureScreenshot]);

    let started = Instant::now();
    let result = dispatcher
        .dispatch(ActionRequest::without_params("capture_screenshot"))
        .await;

    assert!(started.elapsed() < Duration::from_millis(3500));
    let payload = result.payload().expect("capture should succeed");
    let decoded = decode_image(payload["image"].as_str().unwrap()).unwrap();
    assert_eq!(decoded, b"\x89PNG-lingering");
}

#[tokio::test]
async fn test_capture_timeout_terminates_spawned_children() {
    let root = tempfile::tempdir().unwrap();
    let pid_file = root.path().join("child.pid");
    let script = format!("sleep 30 & echo $! > '{}'; wait", pid_file.display());
    let config = BridgeConfig {
        screenshot_command: strings(&["sh", "-c", &script]),
        screenshot_timeout_secs: 1,
        ..test_config(root.path())
    };
    let dispatcher = dispatcher(config, &[ActionKind::CaptureScreenshot]);

    let result = dispatcher
        .dispatch(ActionRequest::without_params("capture_screenshot"))
        .await;

    assert_eq!(result.failure().map(|f| f.kind), Some(ErrorKind::Timeout));
    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let mut gone = false;
    for _ in 0..30 {
        if !process_alive(pid.trim()) || is_zombie(pid.trim()) {
            gone = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(gone, "child of the capture command still running");
}

#[tokio::test]
async fn test_popup_timeout_terminates_process() {
    let root = tempfile::tempdir().unwrap();
    let pid_file = root.path().join("alert.pid");
    let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());
    let config = BridgeConfig {
        alert_command: strings(&["sh", "-c", &script]),
        alert_timeout_secs: 1,
        ..test_config(root.path())
    };
    let dispatcher = dispatcher(config, &[ActionKind::ShowPopup]);

    let mut params = Params::new();
    params.insert("title".to_string(), json!("Productivity Alert"));
    params.insert("message".to_string(), json!("Back to work"));
    let result = dispatcher
        .dispatch(ActionRequest::new("show_popup", params))
        .await;

    let failure = result.failure().expect("popup should time out");
    assert_eq!(failure.kind, ErrorKind::Timeout);
    assert!(failure.detail.contains("Popup display timed out"));
    let pid = std::fs::read_to_string(&pid_file).unwrap();
    assert!(!process_alive(pid.trim()), "alert process still running");
}

#[tokio::test]
async fn test_popup_template_placeholders_reach_command() {
    let root = tempfile::tempdir().unwrap();
    let config = BridgeConfig {
        alert_command: strings(&["sh", "-c", "printf '%s|%s|%s' \"$0\" \"$1\" \"$2\"", "{title}", "{message}", "{severity}"]),
        ..test_config(root.path())
    };
    let dispatcher = dispatcher(config, &[ActionKind::ShowPopup]);

    let mut params = Params::new();
    params.insert("title".to_string(), json!("Focus"));
    params.insert("message".to_string(), json!("close {path} tabs"));
    params.insert("severity".to_string(), json!("info"));
    let result = dispatcher
        .dispatch(ActionRequest::new("show_popup", params))
        .await;

    let payload = result.payload().expect("popup should succeed");
    assert_eq!(payload["response"], "Focus|close {path} tabs|info");
    assert_eq!(payload["severity"], "info");
}
