use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use serde_json::json;

use crate::models::{PageQuery, Pagination};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

/// `GET /events/admin?page=&limit=`: dashboard listing with booking counts.
pub async fn list_events_with_counts(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Response> {
    // A query string that does not even deserialize pages like an empty one.
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Ignoring unusable page query");
            PageQuery::default()
        }
    };
    let pagination = Pagination::from_query(&query);

    let (events, total) = state.events.list_with_booking_counts(pagination).await?;

    Ok(success(
        json!({
            "events": events,
            "pagination": pagination.meta(total),
        }),
        "Events fetched successfully",
    ))
}
