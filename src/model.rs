//! Data models for the link shortener service
//!
//! This module defines the stored link record and the request payload
//! for creating new links. All wire formats use camelCase field names,
//! which is what the dashboard frontend expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short link record stored in the database
///
/// This is both the persisted representation and the API response shape:
/// the record is stored as JSON and returned as-is by the list/detail
/// endpoints.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Opaque unique identifier, assigned at creation (UUID v4)
    pub id: String,

    /// Short code used in the public redirect path (e.g. "abc123")
    ///
    /// 6-8 alphanumeric characters, case-sensitive, unique among live links
    pub code: String,

    /// The absolute URL this link redirects to
    pub target_url: String,

    /// Number of times this link has been resolved
    ///
    /// Defaults to 0 if not present during deserialization
    #[serde(default)]
    pub total_clicks: u64,

    /// Time of the most recent resolved visit, null until the first one
    pub last_clicked: Option<DateTime<Utc>>,

    /// Timestamp when this link was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last mutation, including click accounting
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a new link
///
/// # Example
/// ```json
/// {
///   "targetUrl": "https://example.com/very/long/url",
///   "code": "mylink1"  // Optional
/// }
/// ```
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    /// The absolute URL the new link should redirect to
    pub target_url: String,

    /// Optional caller-chosen short code, 6-8 alphanumeric characters
    ///
    /// If not provided, a random 6-character code will be generated
    pub code: Option<String>,
}
