use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Authenticated Router Module
///
/// Content management routes. The router is wrapped in the session layer by
/// `create_router`, and every handler also takes `SessionToken` to forward the
/// credential as the bearer token.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /api/categories
        // Paginated listing (`page`, `limit`) and multipart creation.
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        // PATCH /api/categories/{id}
        // Rename and/or replace the category artwork.
        .route("/categories/{id}", patch(handlers::update_category))
}
