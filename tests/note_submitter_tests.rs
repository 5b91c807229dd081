//! Gated write path: submissions go through the health gate before touching
//! the endpoint.

mod common;

use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use cardbridge_core::automation::{
    AutomationClient, AutomationClientConfig, NoteDraft, NoteSubmitter,
};
use cardbridge_core::health::{CheckKind, GateError, GateOptions, ProbeOutcome};
use cardbridge_core::BridgeError;
use common::{all_ok_probes, fast_monitor, ScriptedProbe};

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
                let mut buf = [0u8; 8192];
                let _ = socket.read(&mut buf).await;
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

#[tokio::test]
async fn test_submit_note_passes_gate_and_returns_id() {
    let addr = spawn_stub_endpoint(r#"{"result": 42, "error": null}"#).await;
    let client = AutomationClient::new(AutomationClientConfig {
        base_url: format!("http://{addr}"),
        timeout_ms: 1_500,
    })
    .unwrap();

    let (probes, _) = all_ok_probes();
    let monitor = fast_monitor(probes);
    monitor.run_all_checks().await;

    let submitter = NoteSubmitter::new(client, monitor);
    let draft = NoteDraft::capability_probe("Default", "Basic");
    assert_eq!(submitter.submit_note(&draft).await.unwrap(), 42);
}

#[tokio::test]
async fn test_submit_note_rejected_when_service_down() {
    let addr = spawn_stub_endpoint(r#"{"result": 42, "error": null}"#).await;
    let client = AutomationClient::new(AutomationClientConfig {
        base_url: format!("http://{addr}"),
        timeout_ms: 1_500,
    })
    .unwrap();

    let process = ScriptedProbe::always(
        CheckKind::ProcessPresence,
        ProbeOutcome::fail("Application process not found"),
    );
    let monitor = fast_monitor(vec![Box::new(process)]);
    monitor.run_all_checks().await;

    let submitter = NoteSubmitter::new(client, monitor).with_gate_options(GateOptions {
        ttl_ms: 10_000,
        allow_proceed_if_stale: false,
        refresh_if_stale: false,
    });

    let draft = NoteDraft::capability_probe("Default", "Basic");
    match submitter.submit_note(&draft).await.unwrap_err() {
        BridgeError::Gate(gate) => assert_eq!(gate, GateError::ServiceNotReady),
        other => panic!("expected gate rejection, got {other:?}"),
    }
}
