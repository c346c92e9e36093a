use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use kiosk_core::domain::user::KioskUser;
use kiosk_db::repositories::RepositoryError;
use tracing::info;

use super::{bad_json, failure, internal_failure, ApiFailure, ApiState, MessageResponse};

pub async fn list(State(state): State<ApiState>) -> Result<Json<Vec<KioskUser>>, ApiFailure> {
    state
        .users
        .list_all()
        .await
        .map(Json)
        .map_err(|error| internal_failure("api.users.list_failed", error, "Error fetching users"))
}

pub async fn create(
    State(state): State<ApiState>,
    body: Result<Json<KioskUser>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiFailure> {
    let Json(user) = body.map_err(bad_json)?;
    user.validate().map_err(|error| failure(StatusCode::BAD_REQUEST, error.to_string()))?;
    let admission_number = user.admission_number.clone();

    match state.users.create(user).await {
        Ok(()) => {
            info!(
                event_name = "api.users.created",
                admission_number = %admission_number,
                "kiosk user added"
            );
            Ok(Json(MessageResponse { message: "User added successfully" }))
        }
        Err(RepositoryError::Conflict(_)) => Err(failure(
            StatusCode::CONFLICT,
            format!("User `{admission_number}` already exists"),
        )),
        Err(error) => Err(internal_failure("api.users.create_failed", error, "Error adding user")),
    }
}
