//! Canonical forms for the freeform date and time strings organizers submit.
//!
//! Stored events always carry `YYYY-MM-DD` dates and 24-hour `HH:MM` times.

use chrono::NaiveDate;
use thiserror::Error;

use crate::utils::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    OutOfRange(String),
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Interprets `input` as a calendar date at midnight UTC and returns its
/// `YYYY-MM-DD` form.
///
/// Accepts the ISO date-only shapes `YYYY-MM-DD`, `YYYY-MM` and `YYYY`;
/// missing parts default to the first month or day. Impossible dates such
/// as `2024-02-30` are rejected rather than rolled over.
pub fn normalize_date(input: &str) -> Result<String, NormalizeError> {
    let invalid = || NormalizeError::InvalidFormat("Invalid date format".to_string());
    let mut parts = input.trim().split('-');

    let year = parts
        .next()
        .and_then(|p| fixed_digits(p, 4))
        .ok_or_else(invalid)?;
    let month = match parts.next() {
        Some(p) => fixed_digits(p, 2).ok_or_else(invalid)?,
        None => 1,
    };
    let day = match parts.next() {
        Some(p) => fixed_digits(p, 2).ok_or_else(invalid)?,
        None => 1,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }

    let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts `H:MM`, `HH:MM`, optionally followed by an `AM`/`PM` marker,
/// into zero-padded 24-hour `HH:MM`.
pub fn normalize_time(input: &str) -> Result<String, NormalizeError> {
    let invalid = || {
        NormalizeError::InvalidFormat("Invalid time format. Use HH:MM or HH:MM AM/PM".to_string())
    };
    let trimmed = input.trim();

    let (hours_part, rest) = trimmed.split_once(':').ok_or_else(invalid)?;
    if hours_part.is_empty() || hours_part.len() > 2 {
        return Err(invalid());
    }
    let mut hours = hours_part
        .chars()
        .try_fold(0u32, |acc, c| c.to_digit(10).map(|d| acc * 10 + d))
        .ok_or_else(invalid)?;

    if rest.len() < 2 || !rest.is_char_boundary(2) {
        return Err(invalid());
    }
    let (minutes_part, marker) = rest.split_at(2);
    let minutes = fixed_digits(minutes_part, 2).ok_or_else(invalid)?;

    let period = match marker.trim_start().to_ascii_uppercase().as_str() {
        "" => None,
        "AM" => Some(Period::Am),
        "PM" => Some(Period::Pm),
        _ => return Err(invalid()),
    };

    match period {
        Some(Period::Pm) if hours != 12 => hours += 12,
        Some(Period::Am) if hours == 12 => hours = 0,
        _ => {}
    }

    if hours > 23 || minutes > 59 {
        return Err(NormalizeError::OutOfRange("Invalid time values".to_string()));
    }

    Ok(format!("{hours:02}:{minutes:02}"))
}

enum Period {
    Am,
    Pm,
}

/// Parses exactly `len` ASCII digits.
fn fixed_digits(s: &str, len: usize) -> Option<u32> {
    if s.len() != len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
