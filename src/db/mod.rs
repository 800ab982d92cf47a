//! Data access: a lazily established connection pool and the repository
//! traits handlers are written against.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::models::{AdminEvent, Event, EventPatch, NewEvent, Pagination};
use crate::utils::error::{AppError, AppResult};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Process-wide database handle. The pool is created and migrated on first
/// use; every later call returns the same pool.
pub struct Database {
    url: Option<String>,
    pool: OnceCell<PgPool>,
}

impl Database {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            pool: OnceCell::new(),
        }
    }

    pub async fn pool(&self) -> AppResult<&PgPool> {
        let url = self.url.as_deref().ok_or_else(|| {
            AppError::Configuration("DATABASE_URL environment variable is not set".to_string())
        })?;

        self.pool
            .get_or_try_init(|| async move {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(url)
                    .await?;
                tracing::info!("Successfully connected to database");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .map_err(|e| AppError::Database(e.into()))?;
                tracing::info!("Migrations run successfully");

                Ok::<_, AppError>(pool)
            })
            .await
    }
}

/// Deleted event together with the number of bookings removed with it.
#[derive(Debug, Clone)]
pub struct CascadeDelete {
    pub event: Event,
    pub bookings_removed: u64,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Event>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>>;

    /// All events, newest first.
    async fn list_recent(&self) -> AppResult<Vec<Event>>;

    /// Events sharing at least one tag with `slug`, excluding it.
    async fn list_similar(&self, slug: &str) -> AppResult<Vec<Event>>;

    /// One page of events, newest first, each with its booking count, plus
    /// the total number of events.
    async fn list_with_booking_counts(
        &self,
        page: Pagination,
    ) -> AppResult<(Vec<AdminEvent>, i64)>;

    async fn insert(&self, event: NewEvent) -> AppResult<Event>;

    /// Applies `patch` to the event with `slug` and returns the result.
    async fn update_by_slug(&self, slug: &str, patch: &EventPatch) -> AppResult<Option<Event>>;

    /// Removes the event with `slug` and every booking that references it.
    async fn delete_with_bookings(&self, slug: &str) -> AppResult<Option<CascadeDelete>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, event_id: Uuid, email: &str) -> AppResult<()>;

    async fn count_for_event(&self, event_id: Uuid) -> AppResult<i64>;

    async fn delete_for_event(&self, event_id: Uuid) -> AppResult<u64>;
}
