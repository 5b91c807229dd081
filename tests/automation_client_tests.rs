//! Automation client against a canned-response local HTTP endpoint.

use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use cardbridge_core::automation::{
    AutomationClient, AutomationClientConfig, AutomationError, NoteDraft,
};

/// Serve the same JSON body to every request on an ephemeral local port
async fn spawn_stub_endpoint(body: &str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request_complete(&request) {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Headers received and the body matches Content-Length
fn request_complete(data: &[u8]) -> bool {
    let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&data[..header_end]);
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    data.len() >= header_end + 4 + content_length
}

async fn client_for(addr: SocketAddr) -> AutomationClient {
    AutomationClient::new(AutomationClientConfig {
        base_url: format!("http://{addr}"),
        timeout_ms: 1_500,
    })
    .unwrap()
}

#[tokio::test]
async fn test_version_parses_result() {
    let addr = spawn_stub_endpoint(r#"{"result": 6, "error": null}"#).await;
    let client = client_for(addr).await;
    assert_eq!(client.version().await.unwrap(), 6);
}

#[tokio::test]
async fn test_in_band_error_maps_to_service_error() {
    let addr = spawn_stub_endpoint(r#"{"result": null, "error": "unsupported action"}"#).await;
    let client = client_for(addr).await;
    let error = client.version().await.unwrap_err();
    match error {
        AutomationError::Service(message) => assert_eq!(message, "unsupported action"),
        other => panic!("expected Service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_maps_to_malformed() {
    let addr = spawn_stub_endpoint("this is not json").await;
    let client = client_for(addr).await;
    assert!(matches!(
        client.version().await.unwrap_err(),
        AutomationError::Malformed(_)
    ));
}

#[tokio::test]
async fn test_reachability_accepts_error_envelopes() {
    // Reachability only cares that the endpoint answers with parseable JSON;
    // an in-band error still proves the listener is up
    let addr = spawn_stub_endpoint(r#"{"result": null, "error": "collection busy"}"#).await;
    let client = client_for(addr).await;
    client.reachability().await.unwrap();
}

#[tokio::test]
async fn test_can_add_note_returns_verdict() {
    let addr = spawn_stub_endpoint(r#"{"result": false, "error": null}"#).await;
    let client = client_for(addr).await;
    let draft = NoteDraft::capability_probe("Default", "Basic");
    assert!(!client.can_add_note(&draft).await.unwrap());
}

#[tokio::test]
async fn test_add_note_returns_note_id() {
    let addr = spawn_stub_endpoint(r#"{"result": 1496198395707, "error": null}"#).await;
    let client = client_for(addr).await;
    let draft = NoteDraft::capability_probe("Default", "Basic");
    assert_eq!(client.add_note(&draft).await.unwrap(), 1_496_198_395_707);
}

#[tokio::test]
async fn test_deck_names_parses_list() {
    let addr = spawn_stub_endpoint(r#"{"result": ["Default", "Inbox"], "error": null}"#).await;
    let client = client_for(addr).await;
    assert_eq!(client.deck_names().await.unwrap(), vec!["Default", "Inbox"]);
}

#[tokio::test]
async fn test_missing_result_for_version_is_malformed() {
    let addr = spawn_stub_endpoint(r#"{"result": null, "error": null}"#).await;
    let client = client_for(addr).await;
    assert!(matches!(
        client.version().await.unwrap_err(),
        AutomationError::Malformed(_)
    ));
}
