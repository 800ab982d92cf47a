use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::admin::list_events_with_counts;
use crate::handlers::bookings::create_booking;
use crate::handlers::events::{
    create_event, delete_event, get_event, list_events, similar_events, update_event,
};
use crate::handlers::health_check;
use crate::state::AppState;

/// Event forms carry the cover image inline.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn create_routes(state: AppState, production: bool) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(list_events).post(create_event))
        .route("/events/admin", get(list_events_with_counts))
        .route(
            "/events/:slug",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/:slug/similar", get(similar_events))
        .route("/bookings", post(create_booking))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(production))
        .layer(create_cors_layer())
        .with_state(state)
}
