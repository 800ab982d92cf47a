use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::models::CreateBookingRequest;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::created;

/// `POST /bookings`
///
/// Whether the referenced event must exist is a deployment choice; by
/// default bookings are stored without looking the event up.
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(mut request) = payload?;
    request.email = request.email.trim().to_string();
    request.validate()?;

    let event_id = Uuid::parse_str(request.event_id.trim())
        .map_err(|_| AppError::InvalidInput("Invalid event id".to_string()))?;

    if state.booking_requires_event && state.events.find_by_id(event_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Event with id '{event_id}' not found"
        )));
    }

    state.bookings.insert(event_id, &request.email).await?;
    tracing::info!(%event_id, "Booking created");

    Ok(created(json!({ "success": true }), "Booking created successfully"))
}
