use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::{Multipart, Path, State};
use axum::response::Response;
use serde_json::json;

use crate::cache::EVENTS_TAG;
use crate::handlers::form::EventForm;
use crate::media::upload_if_present;
use crate::models::{Event, EventDetail};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, empty_success, success};
use crate::utils::slug::normalize_slug;

fn not_found(slug: &str) -> AppError {
    AppError::NotFound(format!("Event with slug '{slug}' not found"))
}

/// `GET /events`: every event, newest first. Served from the tag cache
/// until a write revalidates it.
pub async fn list_events(State(state): State<AppState>) -> AppResult<Response> {
    if let Some(cached) = state.cache.get(EVENTS_TAG).await {
        return Ok(success(json!({ "events": cached }), "Events fetched successfully"));
    }

    let generation = state.cache.generation(EVENTS_TAG).await;
    let events = state.events.list_recent().await?;
    let value = serde_json::to_value(&events).map_err(|e| AppError::Unknown(e.to_string()))?;
    state
        .cache
        .put_if_current(EVENTS_TAG, generation, value.clone())
        .await;

    Ok(success(json!({ "events": value }), "Events fetched successfully"))
}

/// `POST /events`
pub async fn create_event(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let (mut new_event, image) = EventForm::read(multipart?).await?.into_new_event()?;

    // The insert still maps a unique violation for concurrent creates.
    if state.events.find_by_slug(&new_event.slug).await?.is_some() {
        return Err(AppError::InvalidInput(format!(
            "Event with slug '{}' already exists",
            new_event.slug
        )));
    }

    new_event.image = state.media.upload(image).await?;
    let event = state.events.insert(new_event).await?;

    state.cache.revalidate(EVENTS_TAG).await;
    tracing::info!(slug = %event.slug, id = %event.id, "Event created");

    Ok(created(json!({ "event": event }), "Event created successfully"))
}

/// `GET /events/{slug}`
pub async fn get_event(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Response> {
    let Path(slug) = path?;
    let slug = normalize_slug(&slug)?;

    let event = state
        .events
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| not_found(&slug))?;
    let bookings_count = state.bookings.count_for_event(event.id).await?;

    let detail = EventDetail {
        event,
        bookings_count,
    };
    Ok(success(json!({ "event": detail }), "Event fetched successfully"))
}

/// `PATCH /events/{slug}`
///
/// Everything that can be rejected is checked before the image is uploaded,
/// and the upload completes before the row is touched.
pub async fn update_event(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let Path(slug) = path?;
    let slug = normalize_slug(&slug)?;
    let (mut patch, image) = EventForm::read(multipart?).await?.into_patch()?;

    if let Some(url) = upload_if_present(state.media.as_ref(), image).await? {
        patch.image = Some(url);
    }

    // Nothing to write: answer with the stored event and leave the cache alone.
    if patch.is_empty() {
        let event = state
            .events
            .find_by_slug(&slug)
            .await?
            .ok_or_else(|| not_found(&slug))?;
        return Ok(success(json!({ "event": event }), "Event updated"));
    }

    let event: Event = state
        .events
        .update_by_slug(&slug, &patch)
        .await?
        .ok_or_else(|| not_found(&slug))?;

    state.cache.revalidate(EVENTS_TAG).await;
    tracing::info!(slug = %event.slug, "Event updated");

    Ok(success(json!({ "event": event }), "Event updated"))
}

/// `DELETE /events/{slug}`: removes the event and its bookings.
pub async fn delete_event(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Response> {
    let Path(slug) = path?;
    let slug = normalize_slug(&slug)?;

    let removed = state
        .events
        .delete_with_bookings(&slug)
        .await?
        .ok_or_else(|| not_found(&slug))?;

    state.cache.revalidate(EVENTS_TAG).await;
    tracing::info!(
        slug = %removed.event.slug,
        bookings_removed = removed.bookings_removed,
        "Event deleted"
    );

    Ok(empty_success("Event deleted"))
}

/// `GET /events/{slug}/similar`: events sharing at least one tag.
pub async fn similar_events(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Response> {
    let Path(slug) = path?;
    let slug = normalize_slug(&slug)?;
    let events = state.events.list_similar(&slug).await?;
    Ok(success(json!({ "events": events }), "Similar events fetched successfully"))
}
