use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use food_tracker_core::{day_range, parse_date, FoodItemId, LoggedItem, LoggedItemId, UserId};
use validator::Validate;

use crate::{
    dto::*,
    error::{ApiError, ApiResult},
    AppState,
};

pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<LogDateQuery>,
    payload: Result<Json<CreateLoggedItemRequest>, JsonRejection>,
) -> ApiResult<Json<LoggedItemCreatedResponse>> {
    let logged_item = log_item(&state, &user_id, query, payload)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to log item: {e}")))?;

    Ok(Json(LoggedItemCreatedResponse {
        message: "Successfully logged new item".to_string(),
        logged_item: logged_item.into(),
    }))
}

/// Logged items in the range, each rendered as its food scaled to the logged weight.
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<LoggedItemRangeQuery>,
) -> ApiResult<Json<LoggedItemsResponse>> {
    let logged_items = list_items(&state, &user_id, query)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to get logged items: {e}")))?;

    Ok(Json(LoggedItemsResponse { logged_items }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if let Ok(logged_item_id) = id.parse::<LoggedItemId>() {
        let deleted = state.logged_items.delete(&logged_item_id).await?;
        tracing::debug!(%logged_item_id, deleted, "Delete logged item");
    }

    Ok(Json(MessageResponse::new(format!(
        "Successfully deleted logged item with id={id}"
    ))))
}

async fn log_item(
    state: &AppState,
    user_id: &str,
    query: LogDateQuery,
    payload: Result<Json<CreateLoggedItemRequest>, JsonRejection>,
) -> ApiResult<LoggedItem> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    payload.validate()?;

    let user = parse_user_id(user_id)?;
    let date = match query.date.as_deref() {
        Some(value) => parse_query_date(value)?,
        None => state.clock.now().date_naive(),
    };

    let food = state.backend.food_item(payload.food_name.trim()).await?;
    state.backend.ensure_user_exists(user_id).await?;

    let item = LoggedItem::new(user, FoodItemId::from_uuid(food.id), payload.weight, date);
    let item = state.logged_items.insert(&item).await?;
    tracing::info!(logged_item_id = %item.id, user_id = %item.user_id, food = %food.name, "Logged item");

    Ok(item)
}

async fn list_items(
    state: &AppState,
    user_id: &str,
    query: LoggedItemRangeQuery,
) -> ApiResult<Vec<FoodItemResponse>> {
    let user = parse_user_id(user_id)?;
    let from = match query.from.as_deref() {
        Some(value) => parse_query_date(value)?,
        None => DateTime::<Utc>::UNIX_EPOCH.date_naive(),
    };
    let to = match query.to.as_deref() {
        Some(value) => parse_query_date(value)?,
        None => state.clock.now().date_naive(),
    };

    state.backend.ensure_user_exists(user_id).await?;

    let (start, end) = day_range(from, to);
    let logged_items = state.logged_items.list_for_user(&user, start, end).await?;

    let mut rendered = Vec::with_capacity(logged_items.len());
    for logged in &logged_items {
        let food = state
            .food_items
            .find_by_id(&logged.food_item_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Failed to find food_item_id={}", logged.food_item_id))
            })?;
        rendered.push(FoodItemResponse::for_logged_item(&food, logged));
    }

    Ok(rendered)
}

fn parse_user_id(value: &str) -> ApiResult<UserId> {
    value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user id: {value}")))
}

fn parse_query_date(value: &str) -> ApiResult<NaiveDate> {
    parse_date(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid date {value}, expected dd/mm/YYYY: {e}")))
}
