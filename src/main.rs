use std::sync::Arc;
use streamdesk_console::{
    AppState, BackendState, HttpBackend,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, platform client, then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production settings).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "streamdesk_console=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Console starting in {:?} mode", config.env);
    tracing::info!(api = %config.api_base_url, "Platform API base URL");

    if config.token_secret.is_none() {
        tracing::warn!(
            "ACCESS_TOKEN_SECRET is not set: session tokens are decoded without signature verification"
        );
    }

    // 3. Platform client.
    let backend = HttpBackend::new(&config.api_base_url, config.backend_timeout)
        .expect("FATAL: Failed to build the platform HTTP client.");
    let backend = Arc::new(backend) as BackendState;

    // 4. Router and server.
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(backend, config));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "HTTP server terminated");
    }
}
