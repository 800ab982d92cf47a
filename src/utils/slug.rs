use crate::utils::error::{AppError, AppResult};

/// Validates a slug taken from a request path and returns its lookup form.
pub fn normalize_slug(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Invalid or missing slug parameter".to_string(),
        ));
    }
    Ok(trimmed.to_lowercase())
}

/// Derives a URL-safe slug from an event title.
///
/// Runs of anything other than ASCII letters and digits collapse into a
/// single `-`; the result never starts or ends with one.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("  RustConf-2025 ").unwrap(), "rustconf-2025");
        assert!(matches!(normalize_slug("   "), Err(AppError::InvalidInput(_))));
        assert!(matches!(normalize_slug(""), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("RustConf 2025: The Return!"), "rustconf-2025-the-return");
        assert_eq!(slugify("  --Hello   World--  "), "hello-world");
        assert_eq!(slugify("Café Meetup"), "caf-meetup");
        assert_eq!(slugify("!!!"), "");
    }
}
