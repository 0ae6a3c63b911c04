// src/domain/time_remaining.rs
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A timestamp as the backend serializes it: either a text form
/// (RFC 3339, or a bare `YYYY-MM-DDTHH:MM:SS` assumed UTC) or a field
/// array `[year, month, day, hour, minute, second, nanos]`.
///
/// The array's month is 1-based, and trailing zero fields may be omitted,
/// so `[2025, 1, 15, 10, 30]` is January 15th 10:30:00 UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireInstant {
    Text(String),
    Fields(Vec<i64>),
}

impl WireInstant {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        WireInstant::Text(at.to_rfc3339())
    }

    /// `None` when the value cannot be interpreted as a datetime; callers
    /// treat that as already ended rather than blocking the page.
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            WireInstant::Text(text) => parse_text(text),
            WireInstant::Fields(fields) => {
                if fields.len() < 3 {
                    return None;
                }
                let field = |i: usize| fields.get(i).copied().unwrap_or(0);
                // Months are 1-based both on the wire and in chrono; no
                // index shift. Out-of-range fields make this return None.
                Utc.with_ymd_and_hms(
                    field(0) as i32,
                    field(1) as u32,
                    field(2) as u32,
                    field(3) as u32,
                    field(4) as u32,
                    field(5) as u32,
                )
                .single()
            }
        }
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    // The backend's plain LocalDateTime form carries no offset
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Countdown output: the display label plus a continuous hours-left value
/// for status classification, independent of the label's unit rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRemaining {
    pub label: String,
    pub hours_left: f64,
}

impl TimeRemaining {
    fn ended() -> Self {
        TimeRemaining {
            label: "Ended".to_string(),
            hours_left: 0.0,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.label == "Ended"
    }
}

/// Formats the time left until `end` as the largest two non-zero units.
pub fn remaining(now: DateTime<Utc>, end: &WireInstant) -> TimeRemaining {
    let end = match end.resolve() {
        Some(at) => at,
        None => return TimeRemaining::ended(),
    };

    let secs = end.signed_duration_since(now).num_seconds();
    if secs <= 0 {
        return TimeRemaining::ended();
    }

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    let label = if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    };

    TimeRemaining {
        label,
        hours_left: secs as f64 / 3_600.0,
    }
}

/// Badge shown next to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Active,
    EndingSoon,
    Ended,
}

pub const ENDING_SOON_HOURS: f64 = 24.0;

pub fn classify(ended: bool, time: &TimeRemaining) -> StatusBucket {
    if ended || time.is_ended() {
        StatusBucket::Ended
    } else if time.hours_left <= ENDING_SOON_HOURS {
        StatusBucket::EndingSoon
    } else {
        StatusBucket::Active
    }
}
