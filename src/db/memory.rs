//! In-memory repositories backing the router tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookingRepository, CascadeDelete, EventRepository};
use crate::models::{AdminEvent, Booking, Event, EventPatch, NewEvent, Pagination};
use crate::utils::error::{AppError, AppResult};

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    bookings: Vec<Booking>,
    last_created: Option<DateTime<Utc>>,
}

impl Inner {
    /// Strictly increasing creation times so ordering is deterministic.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(ts);
        ts
    }

    fn newest_first(&self) -> Vec<Event> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bookings_for(&self, event_id: Uuid) -> Vec<Booking> {
        let inner = self.inner.read().await;
        inner
            .bookings
            .iter()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Event>> {
        let inner = self.inner.read().await;
        Ok(inner.events.iter().find(|e| e.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>> {
        let inner = self.inner.read().await;
        Ok(inner.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_recent(&self) -> AppResult<Vec<Event>> {
        Ok(self.inner.read().await.newest_first())
    }

    async fn list_similar(&self, slug: &str) -> AppResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let Some(source) = inner.events.iter().find(|e| e.slug == slug) else {
            return Ok(Vec::new());
        };
        Ok(inner
            .newest_first()
            .into_iter()
            .filter(|e| e.id != source.id && e.tags.iter().any(|t| source.tags.contains(t)))
            .collect())
    }

    async fn list_with_booking_counts(
        &self,
        page: Pagination,
    ) -> AppResult<(Vec<AdminEvent>, i64)> {
        let inner = self.inner.read().await;
        let events = inner.newest_first();
        let total = events.len() as i64;
        let rows = events
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .map(|event| {
                let booking_count =
                    inner.bookings.iter().filter(|b| b.event_id == event.id).count() as i64;
                AdminEvent {
                    event,
                    booking_count,
                }
            })
            .collect();
        Ok((rows, total))
    }

    async fn insert(&self, event: NewEvent) -> AppResult<Event> {
        let mut inner = self.inner.write().await;
        if inner.events.iter().any(|e| e.slug == event.slug) {
            return Err(AppError::InvalidInput(format!(
                "Event with slug '{}' already exists",
                event.slug
            )));
        }
        let created_at = inner.next_timestamp();
        let stored = Event {
            id: Uuid::new_v4(),
            slug: event.slug,
            title: event.title,
            description: event.description,
            overview: event.overview,
            image: event.image,
            venue: event.venue,
            location: event.location,
            date: event.date,
            time: event.time,
            mode: event.mode,
            audience: event.audience,
            organizer: event.organizer,
            tags: event.tags,
            agenda: event.agenda,
            created_at,
            updated_at: created_at,
        };
        inner.events.push(stored.clone());
        Ok(stored)
    }

    async fn update_by_slug(&self, slug: &str, patch: &EventPatch) -> AppResult<Option<Event>> {
        let mut inner = self.inner.write().await;
        Ok(inner.events.iter_mut().find(|e| e.slug == slug).map(|event| {
            patch.apply_to(event);
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn delete_with_bookings(&self, slug: &str) -> AppResult<Option<CascadeDelete>> {
        let mut inner = self.inner.write().await;
        let Some(pos) = inner.events.iter().position(|e| e.slug == slug) else {
            return Ok(None);
        };
        let event = inner.events.remove(pos);
        let before = inner.bookings.len();
        inner.bookings.retain(|b| b.event_id != event.id);
        let bookings_removed = (before - inner.bookings.len()) as u64;
        Ok(Some(CascadeDelete {
            event,
            bookings_removed,
        }))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, event_id: Uuid, email: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.bookings.push(Booking {
            id: Uuid::new_v4(),
            event_id,
            email: email.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn count_for_event(&self, event_id: Uuid) -> AppResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.bookings.iter().filter(|b| b.event_id == event_id).count() as i64)
    }

    async fn delete_for_event(&self, event_id: Uuid) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.bookings.len();
        inner.bookings.retain(|b| b.event_id != event_id);
        Ok((before - inner.bookings.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_for_event_only_touches_that_event() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        BookingRepository::insert(&store, a, "one@example.com").await.unwrap();
        BookingRepository::insert(&store, a, "two@example.com").await.unwrap();
        BookingRepository::insert(&store, b, "three@example.com").await.unwrap();

        assert_eq!(store.delete_for_event(a).await.unwrap(), 2);
        assert_eq!(store.count_for_event(a).await.unwrap(), 0);
        assert_eq!(store.count_for_event(b).await.unwrap(), 1);
    }
}
