use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::api::auth::UserResponse;
use crate::api::state::AppState;
use crate::db::models::User;
use crate::db::UserRepository;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub profile_pic: Option<String>,
}

/// GET /api/users (requires auth)
///
/// The roster shown in the sidebar: everyone except the caller.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = UserRepository::list_except(&state.db, &user.id).await?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// PUT /api/users/update (requires auth)
///
/// Overwrites the caller's profile picture. The only user mutation the
/// API exposes.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let profile_pic = req
        .profile_pic
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::Validation("profilePic is required".to_string()))?;

    let updated = UserRepository::update_profile_pic(&state.db, &user.id, profile_pic).await?;

    Ok(Json(UserResponse::from(&updated)))
}
