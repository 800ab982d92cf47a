use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// How attendees take part. Anything other than the three known modes is
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventMode {
    Online,
    Offline,
    Hybrid,
    Other(String),
}

impl EventMode {
    pub fn as_str(&self) -> &str {
        match self {
            EventMode::Online => "online",
            EventMode::Offline => "offline",
            EventMode::Hybrid => "hybrid",
            EventMode::Other(s) => s,
        }
    }
}

impl From<String> for EventMode {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "online" => EventMode::Online,
            "offline" => EventMode::Offline,
            "hybrid" => EventMode::Hybrid,
            _ => EventMode::Other(value),
        }
    }
}

impl From<EventMode> for String {
    fn from(mode: EventMode) -> Self {
        mode.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    /// Always `YYYY-MM-DD`.
    pub date: String,
    /// Always 24-hour `HH:MM`.
    pub time: String,
    pub mode: EventMode,
    pub audience: String,
    pub organizer: String,
    pub tags: Vec<String>,
    pub agenda: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column layout of the `events` table.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub organizer: String,
    pub tags: Vec<String>,
    pub agenda: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            overview: row.overview,
            image: row.image,
            venue: row.venue,
            location: row.location,
            date: row.date,
            time: row.time,
            mode: EventMode::from(row.mode),
            audience: row.audience,
            organizer: row.organizer,
            tags: row.tags,
            agenda: row.agenda,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EventCountRow {
    #[sqlx(flatten)]
    pub event: EventRow,
    pub booking_count: i64,
}

/// Single-event payload: the event plus how many bookings reference it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub bookings_count: i64,
}

/// Dashboard row produced by the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEvent {
    #[serde(flatten)]
    pub event: Event,
    pub booking_count: i64,
}

impl From<EventCountRow> for AdminEvent {
    fn from(row: EventCountRow) -> Self {
        Self {
            event: row.event.into(),
            booking_count: row.booking_count,
        }
    }
}

/// An event ready to insert. Date and time are already in canonical form.
#[derive(Debug, Clone, Validate)]
pub struct NewEvent {
    #[validate(length(min = 1, message = "slug must not be empty"))]
    pub slug: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "description must be 1-1000 characters"))]
    pub description: String,
    #[validate(length(min = 1, max = 1000, message = "overview must be 1-1000 characters"))]
    pub overview: String,
    /// Hosted URL; filled in once the upload succeeds.
    pub image: String,
    #[validate(length(min = 1, message = "venue is required"))]
    pub venue: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    #[validate(length(min = 1, message = "audience is required"))]
    pub audience: String,
    #[validate(length(min = 1, message = "organizer is required"))]
    pub organizer: String,
    #[validate(length(min = 1, message = "at least one tag is required"))]
    pub tags: Vec<String>,
    #[validate(length(min = 1, message = "at least one agenda item is required"))]
    pub agenda: Vec<String>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct EventPatch {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "description must be 1-1000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "overview must be 1-1000 characters"))]
    pub overview: Option<String>,
    pub image: Option<String>,
    #[validate(length(min = 1, message = "venue must not be empty"))]
    pub venue: Option<String>,
    #[validate(length(min = 1, message = "location must not be empty"))]
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub mode: Option<EventMode>,
    #[validate(length(min = 1, message = "audience must not be empty"))]
    pub audience: Option<String>,
    #[validate(length(min = 1, message = "organizer must not be empty"))]
    pub organizer: Option<String>,
    pub tags: Option<Vec<String>>,
    pub agenda: Option<Vec<String>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.overview.is_none()
            && self.image.is_none()
            && self.venue.is_none()
            && self.location.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.mode.is_none()
            && self.audience.is_none()
            && self.organizer.is_none()
            && self.tags.is_none()
            && self.agenda.is_none()
    }

    /// Writes every present field onto `event`.
    pub fn apply_to(&self, event: &mut Event) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        set(&mut event.title, &self.title);
        set(&mut event.description, &self.description);
        set(&mut event.overview, &self.overview);
        set(&mut event.image, &self.image);
        set(&mut event.venue, &self.venue);
        set(&mut event.location, &self.location);
        set(&mut event.date, &self.date);
        set(&mut event.time, &self.time);
        set(&mut event.mode, &self.mode);
        set(&mut event.audience, &self.audience);
        set(&mut event.organizer, &self.organizer);
        set(&mut event.tags, &self.tags);
        set(&mut event.agenda, &self.agenda);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_round_trips_known_and_free_form() {
        assert_eq!(EventMode::from("Online".to_string()), EventMode::Online);
        assert_eq!(
            EventMode::from("in-person + stream".to_string()),
            EventMode::Other("in-person + stream".to_string())
        );
        assert_eq!(json!(EventMode::Hybrid), json!("hybrid"));
    }

    #[test]
    fn test_patch_validation_rejects_blank_title() {
        let patch = EventPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(EventPatch::default().validate().is_ok());
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let now = Utc::now();
        let mut event = Event {
            id: Uuid::new_v4(),
            slug: "meetup".into(),
            title: "Meetup".into(),
            description: "d".into(),
            overview: "o".into(),
            image: "https://img/a.png".into(),
            venue: "Hall".into(),
            location: "Berlin".into(),
            date: "2025-01-01".into(),
            time: "10:00".into(),
            mode: EventMode::Offline,
            audience: "devs".into(),
            organizer: "org".into(),
            tags: vec!["rust".into()],
            agenda: vec!["intro".into()],
            created_at: now,
            updated_at: now,
        };
        let patch = EventPatch {
            venue: Some("Annex".into()),
            tags: Some(vec!["rust".into(), "wasm".into()]),
            ..Default::default()
        };
        patch.apply_to(&mut event);
        assert_eq!(event.venue, "Annex");
        assert_eq!(event.tags.len(), 2);
        assert_eq!(event.title, "Meetup");
    }
}
