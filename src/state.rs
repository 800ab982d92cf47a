use std::sync::Arc;

use crate::cache::ListingCache;
use crate::config::Config;
use crate::db::{BookingRepository, Database, EventRepository, PgStore};
use crate::media::{CloudinaryUploader, MediaUploader};
use crate::utils::error::AppResult;

/// Shared by every handler. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub media: Arc<dyn MediaUploader>,
    pub cache: Arc<ListingCache>,
    pub booking_requires_event: bool,
}

impl AppState {
    pub fn new(
        events: Arc<dyn EventRepository>,
        bookings: Arc<dyn BookingRepository>,
        media: Arc<dyn MediaUploader>,
        booking_requires_event: bool,
    ) -> Self {
        Self {
            events,
            bookings,
            media,
            cache: Arc::new(ListingCache::new()),
            booking_requires_event,
        }
    }

    /// Production wiring. Nothing connects here; the pool is established by
    /// the first query.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let store = Arc::new(PgStore::new(Arc::new(Database::new(
            config.database_url.clone(),
        ))));
        let media = Arc::new(CloudinaryUploader::new(config.media.clone())?);

        Ok(Self::new(
            store.clone(),
            store,
            media,
            config.booking_requires_event,
        ))
    }
}
