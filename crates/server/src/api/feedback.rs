use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use kiosk_core::domain::feedback::{Feedback, FeedbackSubmission};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{failure, internal_failure, ApiFailure, ApiState, MessageResponse};

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    pub limit: Option<u32>,
}

pub async fn submit(
    State(state): State<ApiState>,
    body: Result<Json<FeedbackSubmission>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiFailure> {
    let submission = body.map(|Json(submission)| submission).unwrap_or_default();
    let feedback = submission
        .into_feedback(format!("fb-{}", Uuid::new_v4()), Utc::now())
        .map_err(|_| failure(StatusCode::BAD_REQUEST, "All fields are required"))?;
    let feedback_id = feedback.id.clone();

    state
        .feedback
        .submit(feedback)
        .await
        .map_err(|error| internal_failure("api.feedback.submit_failed", error, "Failed to submit feedback"))?;

    info!(event_name = "api.feedback.submitted", correlation_id = %feedback_id, "feedback stored");
    Ok(Json(MessageResponse { message: "Feedback submitted successfully" }))
}

/// Newest feedback first.
pub async fn list(
    State(state): State<ApiState>,
    Query(query): Query<FeedbackQuery>,
) -> Result<Json<Vec<Feedback>>, ApiFailure> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

    state
        .feedback
        .list_recent(limit)
        .await
        .map(Json)
        .map_err(|error| internal_failure("api.feedback.list_failed", error, "Error fetching feedback"))
}
