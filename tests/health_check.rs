//! Integration tests for the plain HTTP surface

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use session_gate::auth::{MethodPolicy, RefreshTokenStore, TokenCodec};
use session_gate::configuration::JwtSettings;
use session_gate::session::SessionService;
use session_gate::startup::run;
use session_gate::store::{InMemoryCredentialStore, InMemoryKeyValueStore};

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let codec = TokenCodec::new(&JwtSettings {
        secret: "health-check-secret-key-32-bytes-long".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
        issuer: "chat".to_string(),
        audience: "chat".to_string(),
    })
    .expect("Failed to build codec");
    let session = SessionService::new(
        Arc::new(codec),
        RefreshTokenStore::new(Arc::new(InMemoryKeyValueStore::new()), Duration::from_secs(60)),
        Arc::new(InMemoryCredentialStore::new()),
    );

    let server = run(listener, session, MethodPolicy::default())
        .expect("Failed to create server");

    let _ = tokio::spawn(async move {
        let _ = server.await;
    });

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn health_check_needs_no_authorization() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .header("authorization", "bearer garbage")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn paths_outside_the_rpc_shape_are_rejected() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/not-a-method", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
}
