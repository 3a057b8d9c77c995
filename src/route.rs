//! Route definitions for the link shortener API
//!
//! This module configures all HTTP routes and maps them to their handlers.

use axum::routing::get;
use axum::Router;

use crate::handler::{create_link, delete_link, get_link, list_links, redirect_to_target};
use crate::store::AppState;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /{code}` - Redirects to the link's target URL (public endpoint)
/// - `GET /api/links` - Lists all links, newest first
/// - `POST /api/links` - Creates a new link
/// - `GET /api/links/{code}` - Fetches one link record
/// - `DELETE /api/links/{code}` - Deletes a link (idempotent)
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/links", get(list_links).post(create_link))
        .route("/links/{code}", get(get_link).delete(delete_link));

    Router::new()
        // Public redirect endpoint - resolves a short code to its target
        .route("/{code}", get(redirect_to_target))
        // Mount API routes under /api
        .nest("/api", api_routes)
        // Inject the application state into all handlers
        .with_state(state)
}
