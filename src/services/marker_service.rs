//! Domain service for shared map markers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;

/// Creator name substituted when a marker's user row no longer resolves.
pub const UNKNOWN_CREATOR: &str = "Unknown";

#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for MarkerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A marker annotated with its creator's username resolved at read time.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerView {
    pub id: i32,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub description: Option<String>,
    pub created_at: String,
    pub created_by: String,
}

/// Marker-creation input. Stored verbatim: no range checks on coordinates,
/// no membership check on the kind, no length limits.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMarker {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Domain service trait for marker reads and writes.
#[async_trait::async_trait]
pub trait MarkerService: Send + Sync {
    /// All markers in insertion order, creator usernames resolved at read
    /// time with an `"Unknown"` fallback.
    async fn list_markers(&self) -> Result<Vec<MarkerView>, MarkerError>;

    /// Stores a marker owned by `creator`, timestamping it server-side.
    /// Returns the new marker id.
    async fn create_marker(&self, creator: &User, marker: NewMarker) -> Result<i32, MarkerError>;
}
