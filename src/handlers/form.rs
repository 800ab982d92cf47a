//! Multipart event forms shared by create and patch.

use axum::extract::Multipart;
use validator::Validate;

use crate::media::ImageUpload;
use crate::models::{EventMode, EventPatch, NewEvent};
use crate::utils::datetime::{normalize_date, normalize_time};
use crate::utils::error::{AppError, AppResult};
use crate::utils::slug::slugify;

const IMAGE_FIELD: &str = "image";

/// Text fields in submission order plus the optional image part.
#[derive(Debug, Default)]
pub struct EventForm {
    fields: Vec<(String, String)>,
    image: Option<ImageUpload>,
}

impl EventForm {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = EventForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Malformed form data: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                // A plain text "image" value is never a replacement file.
                if field.file_name().is_none() {
                    continue;
                }
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Unreadable image: {e}")))?;
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Unreadable field '{name}': {e}")))?;
            form.fields.push((name, value));
        }

        Ok(form)
    }

    #[cfg(test)]
    pub fn from_parts(fields: &[(&str, &str)], image: Option<ImageUpload>) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            image,
        }
    }

    /// Validates every field and splits off the image for the uploader.
    pub fn into_patch(self) -> AppResult<(EventPatch, Option<ImageUpload>)> {
        let mut patch = EventPatch::default();

        for (key, value) in self.fields {
            match key.as_str() {
                "tags" => patch.tags = Some(parse_string_list(&key, &value)?),
                "agenda" => patch.agenda = Some(parse_string_list(&key, &value)?),
                "date" => patch.date = Some(normalize_date(&value)?),
                "time" => patch.time = Some(normalize_time(&value)?),
                "mode" => patch.mode = Some(EventMode::from(value.trim().to_string())),
                "title" => patch.title = Some(value.trim().to_string()),
                "description" => patch.description = Some(value.trim().to_string()),
                "overview" => patch.overview = Some(value.trim().to_string()),
                "venue" => patch.venue = Some(value.trim().to_string()),
                "location" => patch.location = Some(value.trim().to_string()),
                "audience" => patch.audience = Some(value.trim().to_string()),
                "organizer" => patch.organizer = Some(value.trim().to_string()),
                "slug" => {
                    return Err(AppError::InvalidInput(
                        "Event slug cannot be changed".to_string(),
                    ))
                }
                other => tracing::debug!(field = other, "Ignoring unknown event field"),
            }
        }

        patch.validate()?;
        Ok((patch, self.image))
    }

    /// Builds a complete event from a creation form. The slug derives from
    /// the title and the image part is mandatory.
    pub fn into_new_event(self) -> AppResult<(NewEvent, ImageUpload)> {
        let (patch, image) = self.into_patch()?;

        let image = image
            .filter(|i| !i.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Image file is required".to_string()))?;

        fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
            value.ok_or_else(|| AppError::InvalidInput(format!("{field} is required")))
        }

        let title = required(patch.title, "title")?;
        let slug = slugify(&title);
        if slug.is_empty() {
            return Err(AppError::InvalidInput(
                "title must contain at least one letter or digit".to_string(),
            ));
        }

        let event = NewEvent {
            slug,
            title,
            description: required(patch.description, "description")?,
            overview: required(patch.overview, "overview")?,
            image: String::new(),
            venue: required(patch.venue, "venue")?,
            location: required(patch.location, "location")?,
            date: required(patch.date, "date")?,
            time: required(patch.time, "time")?,
            mode: required(patch.mode, "mode")?,
            audience: required(patch.audience, "audience")?,
            organizer: required(patch.organizer, "organizer")?,
            tags: required(patch.tags, "tags")?,
            agenda: required(patch.agenda, "agenda")?,
        };
        event.validate()?;

        Ok((event, image))
    }
}

/// `tags` and `agenda` arrive as JSON-encoded string arrays.
fn parse_string_list(field: &str, raw: &str) -> AppResult<Vec<String>> {
    let items: Vec<String> = serde_json::from_str(raw)
        .map_err(|_| AppError::InvalidInput(format!("Invalid {field} format")))?;

    let items: Vec<String> = items.into_iter().map(|s| s.trim().to_string()).collect();
    if items.iter().any(String::is_empty) {
        return Err(AppError::InvalidInput(format!(
            "{field} entries must not be empty"
        )));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> ImageUpload {
        ImageUpload {
            file_name: Some("cover.png".into()),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn creation_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("title", "Rust Meetup: Async Edition"),
            ("description", "Talks about async Rust"),
            ("overview", "An evening of talks"),
            ("venue", "Main Hall"),
            ("location", "Berlin"),
            ("date", "2025-06-01"),
            ("time", "6:30 PM"),
            ("mode", "Hybrid"),
            ("audience", "Developers"),
            ("organizer", "Rust Berlin"),
            ("tags", r#"["rust", "async"]"#),
            ("agenda", r#"["Doors", "Talks", "Q&A"]"#),
        ]
    }

    #[test]
    fn test_patch_normalizes_date_and_time() {
        let form = EventForm::from_parts(&[("date", "2025-01-05"), ("time", "12:15 AM")], None);
        let (patch, image) = form.into_patch().unwrap();
        assert_eq!(patch.date.as_deref(), Some("2025-01-05"));
        assert_eq!(patch.time.as_deref(), Some("00:15"));
        assert!(image.is_none());
    }

    #[test]
    fn test_patch_rejects_malformed_lists_naming_field() {
        let err = EventForm::from_parts(&[("agenda", "not json")], None)
            .into_patch()
            .unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "Invalid agenda format"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = EventForm::from_parts(&[("tags", r#"{"a": 1}"#)], None)
            .into_patch()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg == "Invalid tags format"));
    }

    #[test]
    fn test_patch_rejects_slug_and_ignores_unknown() {
        let err = EventForm::from_parts(&[("slug", "other")], None)
            .into_patch()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let (patch, _) = EventForm::from_parts(&[("createdAt", "yesterday")], None)
            .into_patch()
            .unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_rejects_blank_required_text() {
        let err = EventForm::from_parts(&[("title", "   ")], None)
            .into_patch()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_new_event_from_complete_form() {
        let (event, image) = EventForm::from_parts(&creation_fields(), Some(png()))
            .into_new_event()
            .unwrap();
        assert_eq!(event.slug, "rust-meetup-async-edition");
        assert_eq!(event.time, "18:30");
        assert_eq!(event.mode, EventMode::Hybrid);
        assert_eq!(event.agenda.len(), 3);
        assert_eq!(image.bytes.len(), 4);
    }

    #[test]
    fn test_new_event_requires_image_and_fields() {
        let err = EventForm::from_parts(&creation_fields(), None)
            .into_new_event()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg == "Image file is required"));

        let mut fields = creation_fields();
        fields.retain(|(k, _)| *k != "venue");
        let err = EventForm::from_parts(&fields, Some(png()))
            .into_new_event()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg == "venue is required"));
    }
}
