use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get},
};

/// Admin Router Module
///
/// Oversight routes backed by the platform's `/admin` endpoints: creator
/// moderation and the dashboard counters.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/creators?page=&limit=
        .route("/creators", get(handlers::list_creators))
        // DELETE /api/creators/{id}
        // Removes a creator account. Irreversible upstream.
        .route("/creators/{id}", delete(handlers::delete_creator))
        // GET /api/dashboard/stats
        .route("/dashboard/stats", get(handlers::dashboard_stats))
        // GET /api/dashboard/growth
        .route("/dashboard/growth", get(handlers::growth_overview))
}
