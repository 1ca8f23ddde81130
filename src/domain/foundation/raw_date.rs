//! Loosely-typed date as found in stored documents.
//!
//! Documents written by different clients carry dates in different shapes:
//! `{seconds, nanoseconds}` objects, ISO strings, epoch numbers or a native
//! timestamp. `RawDate` accepts all of them and [`RawDate::normalize`] turns
//! any of them into a [`Timestamp`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Epoch values below this are taken as seconds, at or above as milliseconds.
const SECONDS_CUTOFF: f64 = 1e11;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawDate {
    /// `{ "seconds": 1704412800, "nanoseconds": 0 }`
    Parts {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },

    /// Epoch number, milliseconds or seconds.
    Epoch(f64),

    /// ISO-8601 text, with or without time and offset.
    Text(String),

    /// Already-typed instant.
    Native(Timestamp),

    /// Absent or `null`.
    #[default]
    Missing,
}

/// Result of normalizing a [`RawDate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedDate {
    pub at: Timestamp,
    /// True when the source date was unusable and `at` is the fallback.
    pub estimated: bool,
}

impl RawDate {
    /// Parses the date, returning `None` when the shape is unusable.
    pub fn resolve(&self) -> Option<Timestamp> {
        match self {
            RawDate::Parts {
                seconds,
                nanoseconds,
            } => Timestamp::from_unix_parts(*seconds, *nanoseconds),
            RawDate::Epoch(value) => from_epoch(*value),
            RawDate::Text(text) => parse_text(text),
            RawDate::Native(ts) => Some(*ts),
            RawDate::Missing => None,
        }
    }

    /// Parses the date, substituting `fallback` when unusable.
    pub fn normalize(&self, fallback: Timestamp) -> NormalizedDate {
        match self.resolve() {
            Some(at) => NormalizedDate {
                at,
                estimated: false,
            },
            None => NormalizedDate {
                at: fallback,
                estimated: true,
            },
        }
    }

    /// Parses the date, or the current time when unusable.
    pub fn instant_or_now(&self) -> Timestamp {
        self.resolve().unwrap_or_else(Timestamp::now)
    }
}

impl From<Timestamp> for RawDate {
    fn from(ts: Timestamp) -> Self {
        RawDate::Native(ts)
    }
}

fn from_epoch(value: f64) -> Option<Timestamp> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() < SECONDS_CUTOFF {
        value * 1000.0
    } else {
        value
    };
    Timestamp::from_unix_millis(millis.round() as i64)
}

fn parse_text(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(ts) = Timestamp::parse_rfc3339(text) {
        return Some(ts);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Timestamp::from_datetime(naive.and_utc()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Timestamp::from_datetime(naive.and_utc()));
    }
    // Epoch numbers occasionally arrive as strings.
    text.parse::<f64>().ok().and_then(from_epoch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_5() -> Timestamp {
        Timestamp::parse_rfc3339("2024-01-05T00:00:00Z").unwrap()
    }

    #[test]
    fn all_shapes_of_the_same_instant_normalize_equal() {
        let shapes: Vec<RawDate> = vec![
            serde_json::from_str(r#"{"seconds":1704412800,"nanoseconds":0}"#).unwrap(),
            serde_json::from_str(r#""2024-01-05T00:00:00Z""#).unwrap(),
            serde_json::from_str("1704412800000").unwrap(),
            RawDate::Native(jan_5()),
        ];

        for shape in shapes {
            assert_eq!(shape.resolve(), Some(jan_5()), "{:?}", shape);
        }
    }

    #[test]
    fn small_epoch_values_are_seconds() {
        let raw: RawDate = serde_json::from_str("1704412800").unwrap();
        assert_eq!(raw.resolve(), Some(jan_5()));
    }

    #[test]
    fn underscore_prefixed_parts_are_accepted() {
        let raw: RawDate = serde_json::from_str(r#"{"_seconds":1704412800,"_nanoseconds":0}"#).unwrap();
        assert_eq!(raw.resolve(), Some(jan_5()));
    }

    #[test]
    fn date_only_and_naive_strings_are_utc() {
        assert_eq!(RawDate::Text("2024-01-05".into()).resolve(), Some(jan_5()));
        assert_eq!(
            RawDate::Text("2024-01-05T00:00:00".into()).resolve(),
            Some(jan_5())
        );
    }

    #[test]
    fn null_deserializes_as_missing() {
        let raw: RawDate = serde_json::from_str("null").unwrap();
        assert_eq!(raw, RawDate::Missing);
    }

    #[test]
    fn unusable_dates_fall_back_and_are_flagged() {
        let fallback = jan_5();
        for raw in [RawDate::Missing, RawDate::Text("next tuesday".into())] {
            let normalized = raw.normalize(fallback);
            assert!(normalized.estimated);
            assert_eq!(normalized.at, fallback);
        }
    }

    #[test]
    fn usable_dates_are_not_flagged() {
        let normalized = RawDate::Native(jan_5()).normalize(Timestamp::now());
        assert!(!normalized.estimated);
        assert_eq!(normalized.at, jan_5());
    }

    #[test]
    fn native_serializes_as_iso_string() {
        let json = serde_json::to_string(&RawDate::Native(jan_5())).unwrap();
        assert_eq!(json, r#""2024-01-05T00:00:00Z""#);
    }
}
