use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: the login and password-recovery
/// flows that create one, the session probe, and read access to policy documents.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /api/me
        // Decoded claims of the session cookie; 401 + null when signed out.
        .route("/me", get(handlers::get_me))
        // --- Authentication flows ---
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/forgot-password", post(handlers::forgot_password))
        // Reset flow: the mailed code is confirmed with the `x-reset-token`
        // flow token, which also yields a session.
        .route("/auth/verify-otp", post(handlers::verify_reset_otp))
        .route("/auth/reset-password", post(handlers::reset_password))
        .route("/auth/signup/verify-otp", post(handlers::verify_signup_otp))
        .route("/auth/signup/resend-otp", post(handlers::resend_signup_otp))
        // GET/POST /api/settings/{kind}
        // Reading is open; saving takes the session token in the handler.
        .route(
            "/settings/{kind}",
            get(handlers::get_policy).post(handlers::save_policy),
        )
}
