use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use session_gate::auth::{MethodPolicy, RefreshTokenStore, TokenCodec};
use session_gate::configuration::{get_configuration, SessionStoreBackend};
use session_gate::session::SessionService;
use session_gate::startup::run;
use session_gate::store::{
    InMemoryKeyValueStore, KeyValueStore, PgCredentialStore, PgKeyValueStore,
};
use session_gate::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

fn startup_error(kind: std::io::ErrorKind, message: &str) -> std::io::Error {
    std::io::Error::new(kind, message.to_string())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting session service");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(startup_error(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    // Bad token settings are fatal here rather than on the first request
    let codec = TokenCodec::new(&configuration.jwt).map_err(|e| {
        tracing::error!("Failed to build token codec: {}", e);
        startup_error(std::io::ErrorKind::InvalidInput, "Signing key error")
    })?;

    let connect_timeout = Duration::from_secs(configuration.database.connect_timeout_seconds);
    tracing::info!(
        timeout_seconds = configuration.database.connect_timeout_seconds,
        "Attempting to connect to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(connect_timeout)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            startup_error(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    tracing::info!("Database connection pool created successfully");

    let kv: Arc<dyn KeyValueStore> = match configuration.session_store.backend {
        SessionStoreBackend::Postgres => Arc::new(PgKeyValueStore::new(pool.clone())),
        SessionStoreBackend::Memory => {
            tracing::warn!("Refresh tokens are kept in process memory and lost on restart");
            Arc::new(InMemoryKeyValueStore::new())
        }
    };

    let refresh_ttl = u64::try_from(configuration.jwt.refresh_token_expiry).map_err(|_| {
        tracing::error!(
            "jwt.refresh_token_expiry must not be negative, got {}",
            configuration.jwt.refresh_token_expiry
        );
        startup_error(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    let session = SessionService::new(
        Arc::new(codec),
        RefreshTokenStore::new(kv, Duration::from_secs(refresh_ttl)),
        Arc::new(PgCredentialStore::new(pool)),
    );
    let policy = MethodPolicy::new(configuration.policy.public_methods.clone());

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, session, policy)?;
    tracing::info!("Server started successfully");

    server.await
}
