use async_trait::async_trait;
use sqlx::{Encode, PgExecutor, Postgres, QueryBuilder, Type};
use std::sync::Arc;
use uuid::Uuid;

use super::{BookingRepository, CascadeDelete, Database, EventRepository};
use crate::models::event::{EventCountRow, EventRow};
use crate::models::{AdminEvent, Event, EventPatch, NewEvent, Pagination};
use crate::utils::error::{AppError, AppResult};

const EVENT_COLUMNS: &str = "id, slug, title, description, overview, image, venue, location, \
     date, time, mode, audience, organizer, tags, agenda, created_at, updated_at";

const EVENT_COLUMNS_QUALIFIED: &str = "e.id, e.slug, e.title, e.description, e.overview, \
     e.image, e.venue, e.location, e.date, e.time, e.mode, e.audience, e.organizer, e.tags, \
     e.agenda, e.created_at, e.updated_at";

/// PostgreSQL-backed store for events and their bookings.
#[derive(Clone)]
pub struct PgStore {
    db: Arc<Database>,
}

impl PgStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

fn push_set<'a, T>(query: &mut QueryBuilder<'a, Postgres>, column: &str, value: Option<T>)
where
    T: 'a + Encode<'a, Postgres> + Type<Postgres> + Send,
{
    if let Some(value) = value {
        query.push(", ").push(column).push(" = ").push_bind(value);
    }
}

async fn delete_bookings<'e, E>(executor: E, event_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM bookings WHERE event_id = $1")
        .bind(event_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl EventRepository for PgStore {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Event>> {
        let pool = self.db.pool().await?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Event::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>> {
        let pool = self.db.pool().await?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Event::from))
    }

    async fn list_recent(&self) -> AppResult<Vec<Event>> {
        let pool = self.db.pool().await?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, EventRow>(&sql).fetch_all(pool).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn list_similar(&self, slug: &str) -> AppResult<Vec<Event>> {
        let pool = self.db.pool().await?;
        // An unknown slug yields a NULL tag set, which overlaps nothing.
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE slug <> $1
               AND tags && (SELECT tags FROM events WHERE slug = $1)
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(slug)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn list_with_booking_counts(
        &self,
        page: Pagination,
    ) -> AppResult<(Vec<AdminEvent>, i64)> {
        let pool = self.db.pool().await?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS_QUALIFIED}, COUNT(b.id) AS booking_count
             FROM events e
             LEFT JOIN bookings b ON b.event_id = e.id
             GROUP BY e.id
             ORDER BY e.created_at DESC, e.id DESC
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, EventCountRow>(&sql)
            .bind(i64::from(page.limit))
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(pool)
            .await?;

        Ok((rows.into_iter().map(AdminEvent::from).collect(), total))
    }

    #[tracing::instrument(skip(self, event), fields(slug = %event.slug))]
    async fn insert(&self, event: NewEvent) -> AppResult<Event> {
        let pool = self.db.pool().await?;
        let sql = format!(
            "INSERT INTO events (id, slug, title, description, overview, image, venue, location,
                                 date, time, mode, audience, organizer, tags, agenda)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {EVENT_COLUMNS}"
        );
        let result = sqlx::query_as::<_, EventRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&event.slug)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.overview)
            .bind(&event.image)
            .bind(&event.venue)
            .bind(&event.location)
            .bind(&event.date)
            .bind(&event.time)
            .bind(event.mode.as_str())
            .bind(&event.audience)
            .bind(&event.organizer)
            .bind(&event.tags)
            .bind(&event.agenda)
            .fetch_one(pool)
            .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                AppError::InvalidInput(format!("Event with slug '{}' already exists", event.slug)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update_by_slug(&self, slug: &str, patch: &EventPatch) -> AppResult<Option<Event>> {
        let pool = self.db.pool().await?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE events SET updated_at = NOW()");
        push_set(&mut query, "title", patch.title.as_ref());
        push_set(&mut query, "description", patch.description.as_ref());
        push_set(&mut query, "overview", patch.overview.as_ref());
        push_set(&mut query, "image", patch.image.as_ref());
        push_set(&mut query, "venue", patch.venue.as_ref());
        push_set(&mut query, "location", patch.location.as_ref());
        push_set(&mut query, "date", patch.date.as_ref());
        push_set(&mut query, "time", patch.time.as_ref());
        push_set(&mut query, "mode", patch.mode.as_ref().map(|m| m.as_str()));
        push_set(&mut query, "audience", patch.audience.as_ref());
        push_set(&mut query, "organizer", patch.organizer.as_ref());
        push_set(&mut query, "tags", patch.tags.as_ref());
        push_set(&mut query, "agenda", patch.agenda.as_ref());
        query.push(" WHERE slug = ").push_bind(slug);
        query.push(" RETURNING ").push(EVENT_COLUMNS);

        let row = query
            .build_query_as::<EventRow>()
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Event::from))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_with_bookings(&self, slug: &str) -> AppResult<Option<CascadeDelete>> {
        let pool = self.db.pool().await?;
        let mut tx = pool.begin().await?;

        let sql = format!("DELETE FROM events WHERE slug = $1 RETURNING {EVENT_COLUMNS}");
        let deleted = sqlx::query_as::<_, EventRow>(&sql)
            .bind(slug)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = deleted else {
            tx.rollback().await?;
            return Ok(None);
        };

        let bookings_removed = delete_bookings(&mut *tx, row.id).await?;

        tx.commit().await?;

        Ok(Some(CascadeDelete {
            event: row.into(),
            bookings_removed,
        }))
    }
}

#[async_trait]
impl BookingRepository for PgStore {
    async fn insert(&self, event_id: Uuid, email: &str) -> AppResult<()> {
        let pool = self.db.pool().await?;
        sqlx::query("INSERT INTO bookings (id, event_id, email) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(event_id)
            .bind(email)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn count_for_event(&self, event_id: Uuid) -> AppResult<i64> {
        let pool = self.db.pool().await?;
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    async fn delete_for_event(&self, event_id: Uuid) -> AppResult<u64> {
        let pool = self.db.pool().await?;
        Ok(delete_bookings(pool, event_id).await?)
    }
}
