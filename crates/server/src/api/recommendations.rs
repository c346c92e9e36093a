use axum::{
    extract::{Query, State},
    Json,
};
use kiosk_core::recommendations::RecommendationResult;
use serde::Deserialize;

use super::{internal_failure, ApiFailure, ApiState};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub async fn recommend(
    State(state): State<ApiState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResult>, ApiFailure> {
    state.engine.get_recommendations(query.user_id.as_deref()).await.map(Json).map_err(|error| {
        internal_failure("api.recommendations.failed", error, "Failed to generate recommendations")
    })
}
