use axum::{
    extract::{Path, State},
    Json,
};

use crate::{dto::*, error::ApiResult, AppState};

/// Cached food item, or one fetched from the nutrition API and cached.
pub async fn get(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> ApiResult<Json<FoodItemEnvelope>> {
    let item = state.nutrition.fetch_or_cache(&query).await?;

    Ok(Json(FoodItemEnvelope {
        food_item: item.into(),
    }))
}
