use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use food_tracker_core::{UserId, UserInfo};
use validator::Validate;

use crate::{
    clients::ClientError,
    dto::*,
    error::{ApiError, ApiResult},
    AppState,
};

const USER_NOT_FOUND: &str = "User not found";

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserInfoRequest>, JsonRejection>,
) -> ApiResult<Json<UserInfoChangedResponse>> {
    let Json(payload) =
        payload.map_err(|e| ApiError::BadRequest(format!("Failed to create user: {e}")))?;
    payload.validate()?;

    let user = state.user_infos.insert(&UserInfo::from(payload)).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User created");

    Ok(Json(UserInfoChangedResponse {
        message: "User successfully created".to_string(),
        user_info: user.into(),
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserInfoResponse>> {
    let user = find_user(&state, &id).await?;
    Ok(Json(user.into()))
}

/// Removes the user together with everything they logged.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserInfoChangedResponse>> {
    let user = find_user(&state, &id).await?;

    let removed_items = state.logged_items.delete_for_user(&user.id).await?;
    state.user_infos.delete(&user.id).await?;
    tracing::info!(user_id = %user.id, removed_items, "User deleted");

    Ok(Json(UserInfoChangedResponse {
        message: "User successfully deleted".to_string(),
        user_info: user.into(),
    }))
}

pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserInfoResponse>> {
    let user = state
        .user_infos
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(user.into()))
}

pub async fn daily_rda(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let rda = state
        .rda
        .as_ref()
        .ok_or(ClientError::NotConfigured("daily RDA service"))?;
    let user = find_user(&state, &id).await?;

    Ok(Json(rda.daily_rda(&user).await?))
}

async fn find_user(state: &AppState, id: &str) -> ApiResult<UserInfo> {
    let not_found = || ApiError::NotFound(USER_NOT_FOUND.to_string());
    let id: UserId = id.parse().map_err(|_| not_found())?;

    state.user_infos.find_by_id(&id).await?.ok_or_else(not_found)
}
