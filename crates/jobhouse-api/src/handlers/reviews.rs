//! Customer review handlers.

use axum::extract::State;
use axum::Json;

use jobhouse_models::Review;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /customerReviews`
pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<Review>>> {
    Ok(Json(state.reviews.list().await?))
}
