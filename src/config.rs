use std::{env, time::Duration};

/// AppConfig
///
/// Holds the console's entire configuration state. Loaded once at startup and
/// shared immutably through `AppState` (pulled out by handlers via `FromRef`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format, cookie `Secure` flag and
    // whether token signatures must be verified.
    pub env: Env,
    // Base URL of the platform REST API (everything before `/api/v1/...`).
    pub api_base_url: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Directory holding the pre-built console shell (index.html + assets).
    pub asset_dir: String,
    // HS256 secret used to verify access tokens. When absent, tokens are only decoded.
    pub token_secret: Option<String>,
    // Per-request timeout applied to calls against the platform API.
    pub backend_timeout: Duration,
}

/// Env
///
/// Defines the runtime context: `Local` for development (pretty logs, plain
/// cookies, decode-only tokens allowed) and `Production` (JSON logs, `Secure`
/// cookies, mandatory signature verification).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ASSET_DIR: &str = "public";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 15;

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            asset_dir: DEFAULT_ASSET_DIR.to_string(),
            token_secret: None,
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (after `.env` has been
    /// loaded by `main`).
    ///
    /// # Panics
    /// Panics in production when `API_BASE_URL` or `ACCESS_TOKEN_SECRET` is
    /// missing, so the console never starts pointed at a default backend or
    /// accepting unsigned credentials.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let backend_timeout = env::var("BACKEND_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS));

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let asset_dir = env::var("ASSET_DIR").unwrap_or_else(|_| DEFAULT_ASSET_DIR.to_string());
        let token_secret = env::var("ACCESS_TOKEN_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty());

        match env {
            Env::Local => Self {
                env: Env::Local,
                api_base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
                bind_addr,
                asset_dir,
                token_secret,
                backend_timeout,
            },
            Env::Production => Self {
                env: Env::Production,
                api_base_url: env::var("API_BASE_URL")
                    .expect("FATAL: API_BASE_URL required in prod"),
                bind_addr,
                asset_dir,
                token_secret: Some(
                    token_secret.expect("FATAL: ACCESS_TOKEN_SECRET must be set in production."),
                ),
                backend_timeout,
            },
        }
    }

    /// Whether session cookies carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}
