//! HTTP request handlers for the link shortener API
//!
//! This module implements the core behavior:
//! - Creating links with custom or randomly generated codes
//! - Resolving short codes to redirects with fire-and-forget click accounting
//! - Listing, fetching and deleting links

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use url::Url;

use crate::allocator;
use crate::error::AppError;
use crate::model::{CreateLinkRequest, Link};
use crate::store::AppState;

/// Upper bound on a redirect lookup before it surfaces as a 500
///
/// The redirect path never retries; a store that cannot answer within
/// the budget produces a transient failure instead of a hanging request.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Creates a new short link
///
/// Validates the target URL, resolves a code (caller-supplied or random),
/// and persists the record.
///
/// # Request Body
///
/// ```json
/// {
///   "targetUrl": "https://example.com/very/long/url",
///   "code": "mylink1"  // Optional
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - the full link record
/// - **400 Bad Request** - malformed URL or code pattern
/// - **409 Conflict** - requested code already in use
/// - **500 Internal Server Error** - allocation exhausted or store failure
pub async fn create_link(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let target = Url::parse(&payload.target_url).map_err(|_| AppError::InvalidUrl)?;
    if !target.has_host() {
        return Err(AppError::InvalidUrl);
    }

    // Treat an empty code field the same as an omitted one
    let requested = payload.code.filter(|code| !code.is_empty());
    let code = allocator::allocate(state.store.as_ref(), requested).await?;

    // A concurrent create may have claimed the code after the allocator's
    // pre-check; the store's Duplicate error maps to 409 here.
    let link = state.store.create(&code, payload.target_url.as_str()).await?;

    tracing::debug!("created link '{}' -> {}", link.code, link.target_url);

    Ok((StatusCode::CREATED, Json(link)))
}

/// Resolves a short code and redirects to its target URL
///
/// This is the public hot path. When a visitor hits `/{code}`, the handler:
/// 1. Looks up the code (bounded by [`LOOKUP_TIMEOUT`])
/// 2. Replies with a 302 redirect to the target URL
/// 3. Dispatches click accounting on a detached task
///
/// The accounting task is never awaited: a slow or failing store can delay
/// or lose a click count, but never the redirect itself.
///
/// # Response
///
/// - **302 Found** - `Location` header points at the target URL
/// - **404 Not Found** - code unknown
/// - **500 Internal Server Error** - store failed or timed out on lookup
pub async fn redirect_to_target(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let link = tokio::time::timeout(LOOKUP_TIMEOUT, state.store.find_by_code(&code))
        .await
        .map_err(|_| AppError::StoreUnavailable("lookup timed out".to_string()))??
        .ok_or(AppError::NotFound)?;

    // Fire-and-forget click accounting; failures are logged and swallowed
    let store = state.store.clone();
    tokio::spawn(async move {
        if let Err(err) = store.record_click(&code).await {
            tracing::warn!("failed to record click for '{}': {}", code, err);
        }
    });

    Ok((StatusCode::FOUND, [(header::LOCATION, link.target_url)]).into_response())
}

/// Lists all links, newest first
///
/// # Response
///
/// - **200 OK** - array of link records ordered by creation time descending
/// - **500 Internal Server Error** - store failure
pub async fn list_links(State(state): State<AppState>) -> Result<Json<Vec<Link>>, AppError> {
    let links = state.store.list().await?;
    Ok(Json(links))
}

/// Fetches a single link record by code
///
/// Backs the stats page of the dashboard.
///
/// # Response
///
/// - **200 OK** - the link record
/// - **404 Not Found** - code unknown
pub async fn get_link(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Link>, AppError> {
    let link = state
        .store
        .find_by_code(&code)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(link))
}

/// Deletes a link by code
///
/// Idempotent: deleting a code that does not exist is not an error. After
/// deletion the code is immediately available for reuse.
///
/// # Response
///
/// - **204 No Content** - deleted, or was already absent
pub async fn delete_link(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.store.delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
