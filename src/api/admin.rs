use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, AppState, MessageResponse};
use crate::db::User;
use crate::services::require_admin;

#[derive(Serialize)]
pub struct PendingUserDto {
    pub id: i32,
    pub username: String,
}

/// GET /admin/pending
/// Accounts waiting for approval (admin only)
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<PendingUserDto>>, ApiError> {
    require_admin(&user)?;

    let pending = state.auth.list_pending().await?;

    Ok(Json(
        pending
            .into_iter()
            .map(|u| PendingUserDto {
                id: u.id,
                username: u.username,
            })
            .collect(),
    ))
}

/// POST /admin/approve/{user_id}
/// Approve a pending account (admin only)
pub async fn approve_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&user)?;

    let approved = state.auth.approve(user_id).await?;

    Ok(Json(MessageResponse {
        message: format!("User {} approved", approved.username),
    }))
}
