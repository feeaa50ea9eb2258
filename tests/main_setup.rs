use serial_test::serial;
use std::{env, panic, time::Duration};
use streamdesk_console::{AppConfig, config::Env};

const CONFIG_VARS: &[&str] = &[
    "APP_ENV",
    "API_BASE_URL",
    "ACCESS_TOKEN_SECRET",
    "BIND_ADDR",
    "ASSET_DIR",
    "BACKEND_TIMEOUT_SECS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with the given variables set (and every other config variable
/// unset), restoring the original environment afterwards.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:5000");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.asset_dir, "public");
    assert_eq!(config.token_secret, None);
    assert_eq!(config.backend_timeout, Duration::from_secs(15));
    assert!(!config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_reads_overrides() {
    let config = run_with_env(
        &[
            ("API_BASE_URL", "https://api.streamdesk.tv"),
            ("ACCESS_TOKEN_SECRET", "s3cret"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("ASSET_DIR", "/srv/console"),
            ("BACKEND_TIMEOUT_SECS", "4"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "https://api.streamdesk.tv");
    assert_eq!(config.token_secret.as_deref(), Some("s3cret"));
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.asset_dir, "/srv/console");
    assert_eq!(config.backend_timeout, Duration::from_secs(4));
}

#[test]
#[serial]
fn test_app_config_ignores_unparseable_timeout_and_empty_secret() {
    let config = run_with_env(
        &[("BACKEND_TIMEOUT_SECS", "soon"), ("ACCESS_TOKEN_SECRET", "")],
        AppConfig::load,
    );

    assert_eq!(config.backend_timeout, Duration::from_secs(15));
    assert_eq!(config.token_secret, None);
}

#[test]
#[serial]
fn test_app_config_production_requires_token_secret() {
    let result = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.streamdesk.tv"),
        ],
        || panic::catch_unwind(AppConfig::load),
    );

    assert!(
        result.is_err(),
        "Production config loading should panic without ACCESS_TOKEN_SECRET"
    );
}

#[test]
#[serial]
fn test_app_config_production_requires_api_base_url() {
    let result = run_with_env(
        &[("APP_ENV", "production"), ("ACCESS_TOKEN_SECRET", "s3cret")],
        || panic::catch_unwind(AppConfig::load),
    );

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_app_config_production_enables_secure_cookies() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.streamdesk.tv"),
            ("ACCESS_TOKEN_SECRET", "s3cret"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert!(config.secure_cookies());
}
