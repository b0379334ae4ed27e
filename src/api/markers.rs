use axum::{
    Extension, Json,
    extract::State,
};
use std::sync::Arc;

use super::{ApiError, AppState, MessageResponse};
use crate::db::User;
use crate::services::{MarkerView, NewMarker};

/// GET /markers
/// All markers with creator usernames resolved at read time
pub async fn list_markers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MarkerView>>, ApiError> {
    Ok(Json(state.markers.list_markers().await?))
}

/// POST /markers
/// Store a marker owned by the authenticated user
pub async fn create_marker(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(payload): Json<NewMarker>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.markers.create_marker(&user, payload).await?;

    Ok(Json(MessageResponse {
        message: "Marker added".to_string(),
    }))
}
