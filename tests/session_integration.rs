use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use session_gate::auth::{hash_password_with_cost, HashScheme, MethodPolicy, RefreshTokenStore, TokenCodec};
use session_gate::configuration::JwtSettings;
use session_gate::error::ErrorResponse;
use session_gate::session::SessionService;
use session_gate::startup::{rpc_path, run};
use session_gate::store::{CredentialRecord, InMemoryCredentialStore, InMemoryKeyValueStore};

const USER_ID: &str = "0b5e1f7a-3c2d-4e8f-9a1b-2c3d4e5f6a7b";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    async fn call(&self, method: &str, body: Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, rpc_path(method)))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    async fn call_with_token(&self, method: &str, token: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, rpc_path(method)))
            .header("authorization", format!("bearer {}", token))
            .json(&json!({}))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    async fn login(&self) -> Value {
        let response = self
            .call("Login", json!({ "email": "a@b.com", "password": "secret" }))
            .await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }
}

fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-at-least-32-bytes".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
        issuer: "chat".to_string(),
        audience: "chat".to_string(),
    }
}

async fn spawn_app_with_policy(policy: MethodPolicy) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let credentials = InMemoryCredentialStore::new();
    credentials.insert(CredentialRecord {
        user_id: USER_ID.to_string(),
        name: "Alice".to_string(),
        email: "a@b.com".to_string(),
        password_hash: hash_password_with_cost("secret", 4).expect("Failed to hash password"),
        hash_scheme: HashScheme::Bcrypt,
    });

    let session = SessionService::new(
        Arc::new(TokenCodec::new(&jwt_settings()).expect("Failed to build codec")),
        RefreshTokenStore::new(
            Arc::new(InMemoryKeyValueStore::new()),
            Duration::from_secs(604_800),
        ),
        Arc::new(credentials),
    );

    let server = run(listener, session, policy).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with_policy(MethodPolicy::default()).await
}

async fn error_code(response: reqwest::Response) -> String {
    let body: ErrorResponse = response.json().await.expect("Failed to parse error body");
    body.code
}

// --- Login ---

#[tokio::test]
async fn login_returns_access_and_refresh_tokens() {
    let app = spawn_app().await;

    let body = app.login().await;
    let tokens = &body["tokens"];

    assert!(!tokens["access_token"].as_str().unwrap().is_empty());
    assert!(!tokens["refresh_token"].as_str().unwrap().is_empty());
    assert!(tokens["expires_at"].as_i64().unwrap() > chrono::Utc::now().timestamp());
}

#[tokio::test]
async fn login_returns_400_for_missing_fields() {
    let app = spawn_app().await;

    let cases = vec![
        (json!({ "email": "", "password": "secret" }), "empty email"),
        (json!({ "email": "a@b.com", "password": "" }), "empty password"),
        (json!({ "password": "secret" }), "missing email"),
        (json!({}), "empty body"),
    ];

    for (body, reason) in cases {
        let response = app.call("Login", body).await;
        assert_eq!(400, response.status().as_u16(), "Should reject: {}", reason);
        assert_eq!(error_code(response).await, "INVALID_ARGUMENT");
    }
}

#[tokio::test]
async fn login_returns_401_without_revealing_which_part_was_wrong() {
    let app = spawn_app().await;

    let unknown = app
        .call("Login", json!({ "email": "x@y.com", "password": "secret" }))
        .await;
    let wrong = app
        .call("Login", json!({ "email": "a@b.com", "password": "nope" }))
        .await;

    assert_eq!(401, unknown.status().as_u16());
    assert_eq!(401, wrong.status().as_u16());

    let unknown: ErrorResponse = unknown.json().await.unwrap();
    let wrong: ErrorResponse = wrong.json().await.unwrap();
    assert_eq!(unknown.message, wrong.message);
    assert_eq!(unknown.code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn malformed_json_is_invalid_argument() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(&format!("{}{}", app.address, rpc_path("Login")))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

// --- Full session lifecycle ---

#[tokio::test]
async fn login_refresh_logout_lifecycle() {
    let app = spawn_app().await;

    let login = app.login().await;
    let refresh_token = login["tokens"]["refresh_token"].as_str().unwrap().to_string();

    let refreshed = app
        .call(
            "RefreshToken",
            json!({ "user_id": USER_ID, "refresh_token": refresh_token }),
        )
        .await;
    assert_eq!(200, refreshed.status().as_u16());
    let refreshed: Value = refreshed.json().await.unwrap();
    assert!(!refreshed["tokens"]["access_token"].as_str().unwrap().is_empty());
    assert_eq!(refreshed["tokens"]["refresh_token"], refresh_token.as_str());

    let logout = app
        .call(
            "Logout",
            json!({ "user_id": USER_ID, "refresh_token": refresh_token }),
        )
        .await;
    assert_eq!(200, logout.status().as_u16());
    let logout: Value = logout.json().await.unwrap();
    assert_eq!(logout["success"], true);

    let after_logout = app
        .call(
            "RefreshToken",
            json!({ "user_id": USER_ID, "refresh_token": refresh_token }),
        )
        .await;
    assert_eq!(401, after_logout.status().as_u16());
    assert_eq!(error_code(after_logout).await, "UNAUTHENTICATED");
}

#[tokio::test]
async fn refresh_rejects_forged_token() {
    let app = spawn_app().await;
    app.login().await;

    let response = app
        .call(
            "RefreshToken",
            json!({ "user_id": USER_ID, "refresh_token": "forged" }),
        )
        .await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_and_logout_require_both_fields() {
    let app = spawn_app().await;

    for method in ["RefreshToken", "Logout"] {
        let response = app.call(method, json!({ "user_id": USER_ID })).await;
        assert_eq!(400, response.status().as_u16(), "{} without token", method);

        let response = app.call(method, json!({ "refresh_token": "abc" })).await;
        assert_eq!(400, response.status().as_u16(), "{} without user id", method);
    }
}

// --- ValidateToken ---

#[tokio::test]
async fn validate_token_reports_claims_for_live_token() {
    let app = spawn_app().await;
    let login = app.login().await;
    let access_token = login["tokens"]["access_token"].as_str().unwrap();

    let response = app
        .call("ValidateToken", json!({ "access_token": access_token }))
        .await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["valid"], true);
    assert_eq!(body["claims"]["sub"], USER_ID);
    assert_eq!(body["claims"]["email"], "a@b.com");
    assert_eq!(body["claims"]["roles"], json!(["user"]));
}

#[tokio::test]
async fn validate_token_is_a_query_not_a_gate() {
    let app = spawn_app().await;

    for token in ["", "garbage", "a.b.c"] {
        let response = app
            .call("ValidateToken", json!({ "access_token": token }))
            .await;
        assert_eq!(200, response.status().as_u16());

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["valid"], false);
        assert!(body.get("claims").is_none());
    }
}

// --- Access interceptor ---

#[tokio::test]
async fn protected_method_without_header_is_unauthenticated() {
    let app = spawn_app().await;

    let response = app.call("WhoAmI", json!({})).await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "UNAUTHENTICATED");
}

#[tokio::test]
async fn public_method_without_header_is_allowed() {
    let app = spawn_app().await;

    let response = app
        .call("ValidateToken", json!({ "access_token": "x" }))
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn protected_method_receives_caller_identity() {
    let app = spawn_app().await;
    let login = app.login().await;
    let access_token = login["tokens"]["access_token"].as_str().unwrap();

    let response = app.call_with_token("WhoAmI", access_token).await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["claims"]["sub"], USER_ID);
    assert_eq!(body["claims"]["name"], "Alice");
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() {
    let app = spawn_app().await;
    let login = app.login().await;
    let access_token = login["tokens"]["access_token"].as_str().unwrap();

    for scheme in ["Bearer", "BEARER", "bEaReR"] {
        let response = app
            .client
            .post(&format!("{}{}", app.address, rpc_path("WhoAmI")))
            .header("authorization", format!("{} {}", scheme, access_token))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(200, response.status().as_u16(), "scheme {}", scheme);
    }
}

#[tokio::test]
async fn protected_method_rejects_bad_credentials_generically() {
    let app = spawn_app().await;
    let login = app.login().await;
    let access_token = login["tokens"]["access_token"].as_str().unwrap();

    let headers = vec![
        format!("Basic {}", access_token),
        access_token.to_string(),
        "bearer not.a.jwt".to_string(),
        format!("bearer {}x", access_token),
    ];

    let mut messages = Vec::new();
    for header in headers {
        let response = app
            .client
            .post(&format!("{}{}", app.address, rpc_path("WhoAmI")))
            .header("authorization", header.clone())
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(401, response.status().as_u16(), "header {}", header);

        let body: ErrorResponse = response.json().await.unwrap();
        messages.push(body.message);
    }

    messages.dedup();
    assert_eq!(messages, vec!["Request unauthenticated".to_string()]);
}

#[tokio::test]
async fn alternate_policy_changes_what_is_public() {
    let app = spawn_app_with_policy(MethodPolicy::new(vec!["Login"])).await;

    let validate = app
        .call("ValidateToken", json!({ "access_token": "x" }))
        .await;
    assert_eq!(401, validate.status().as_u16());

    app.login().await;
}
