use chrono::{DateTime, Local, NaiveTime, SecondsFormat, Utc};
use serde_json::Value;
use store::Document;

use crate::error::AppError;

/// Fixed-width UTC, millisecond precision. Sorts lexicographically.
pub fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_iso() -> String {
    iso(Utc::now())
}

/// Local midnight of the day `now` falls on, expressed in UTC.
pub fn start_of_day(now: DateTime<Local>) -> DateTime<Utc> {
    now.date_naive()
        .and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .map_or_else(|| now.with_timezone(&Utc), |midnight| midnight.with_timezone(&Utc))
}

pub fn start_of_today_iso() -> String {
    iso(start_of_day(Local::now()))
}

/// Absent and empty both count as missing.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

pub fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    non_empty(value).ok_or(AppError::MissingField(field))
}

/// Unwraps a `json!` object literal into a store document.
pub fn object(value: Value) -> Document {
    match value {
        Value::Object(fields) => fields,
        _ => Document::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_iso_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 8, 5, 0).unwrap();

        assert_eq!(iso(at), "2026-10-17T08:05:00.000Z");
    }

    #[test]
    fn test_iso_sorts_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();

        assert!(iso(earlier) < iso(later));
    }

    #[test]
    fn test_start_of_day() {
        let now = Local.with_ymd_and_hms(2026, 10, 17, 15, 42, 7).unwrap();

        let start = start_of_day(now).with_timezone(&Local);

        assert_eq!(start.date_naive(), now.date_naive());
        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));
        assert!(start <= now);
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some("CARD1".into()), "cardId").unwrap(), "CARD1");
        assert!(matches!(
            required(Some(String::new()), "cardId"),
            Err(AppError::MissingField("cardId"))
        ));
        assert!(matches!(
            required(None, "name"),
            Err(AppError::MissingField("name"))
        ));
    }

    #[test]
    fn test_object() {
        let document = object(json!({ "cardId": "CARD1" }));

        assert_eq!(document["cardId"], "CARD1");
        assert!(object(json!("scalar")).is_empty());
    }
}
