use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shared_utils::time::{format_date_time, matches_date_format, matches_date_time_format, parse_date, parse_date_time};

use crate::error::TimeSlotError;

/// Stored availability window `[from, to)` of one doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    pub doctor_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeSlot {
    pub doctor_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl NewTimeSlot {
    pub fn into_time_slot(self) -> TimeSlot {
        TimeSlot {
            id: Uuid::new_v4(),
            doctor_id: self.doctor_id,
            from: self.from,
            to: self.to,
        }
    }
}

/// Caller-facing projection of a slot; owner and id are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotView {
    pub from: String,
    pub to: String,
}

impl From<&TimeSlot> for TimeSlotView {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            from: format_date_time(&slot.from),
            to: format_date_time(&slot.to),
        }
    }
}

/// Non-empty half-open range; `from < to` holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl SlotRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, TimeSlotError> {
        if from >= to {
            return Err(TimeSlotError::InvalidRange("'from' must be before 'to'".to_string()));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }
}

/// Body of `POST`/`DELETE /timeslots/{doctor_id}`. A missing or non-string
/// bound deserializes to `None` and is reported by `parse` as a format error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSlotRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub to: Option<String>,
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_str().map(str::to_string))
}

impl TimeSlotRequest {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        }
    }

    pub fn parse(&self) -> Result<SlotRange, TimeSlotError> {
        let from = required_date_time("from", self.from.as_deref())?;
        let to = required_date_time("to", self.to.as_deref())?;

        match (parse_date_time(from), parse_date_time(to)) {
            (Some(from), Some(to)) => SlotRange::new(from, to),
            _ => Err(TimeSlotError::InvalidRange("'from' and 'to' must be valid dates".to_string())),
        }
    }
}

fn required_date_time<'a>(name: &str, raw: Option<&'a str>) -> Result<&'a str, TimeSlotError> {
    match raw {
        Some(raw) if matches_date_time_format(raw) => Ok(raw),
        _ => Err(TimeSlotError::InvalidRange(format!(
            "{} must be in the format 'YYYY-MM-DDTHH:mm'",
            name
        ))),
    }
}

/// Query string of `GET /timeslots/{doctor_id}`; both bounds are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSlotQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TimeSlotQuery {
    /// Resolves the query window. `from` defaults to midnight of `now`'s day,
    /// `to` to one day after `from`.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), TimeSlotError> {
        let from = match &self.from {
            Some(raw) => parse_query_date("from", raw)?,
            None => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
        };
        let to = match &self.to {
            Some(raw) => parse_query_date("to", raw)?,
            None => from + Duration::days(1),
        };
        Ok((from, to))
    }
}

fn parse_query_date(name: &str, raw: &str) -> Result<DateTime<Utc>, TimeSlotError> {
    if !matches_date_format(raw) {
        return Err(TimeSlotError::InvalidRange(format!(
            "\"{}\" must be in the format \"YYYY-MM-DD\"",
            name
        )));
    }
    parse_date(raw).ok_or_else(|| TimeSlotError::InvalidRange(format!("\"{}\" must be a valid date", name)))
}

/// Which stored slots a repository read or delete selects, relative to a
/// window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotFilter {
    /// `stored.from >= from && stored.to <= to`
    ContainedIn { from: DateTime<Utc>, to: DateTime<Utc> },
    /// Overlapping or sharing an endpoint: `stored.from <= to && stored.to >= from`
    Touching { from: DateTime<Utc>, to: DateTime<Utc> },
    /// Strictly around the window: `stored.from < from && stored.to > to`
    Encloses { from: DateTime<Utc>, to: DateTime<Utc> },
    /// Ends inside the window: `stored.to > from && stored.to <= to`
    LeftEdge { from: DateTime<Utc>, to: DateTime<Utc> },
    /// Starts inside the window: `stored.from >= from && stored.from < to`
    RightEdge { from: DateTime<Utc>, to: DateTime<Utc> },
}

impl SlotFilter {
    pub fn matches(&self, slot: &TimeSlot) -> bool {
        match *self {
            SlotFilter::ContainedIn { from, to } => slot.from >= from && slot.to <= to,
            SlotFilter::Touching { from, to } => slot.from <= to && slot.to >= from,
            SlotFilter::Encloses { from, to } => slot.from < from && slot.to > to,
            SlotFilter::LeftEdge { from, to } => slot.to > from && slot.to <= to,
            SlotFilter::RightEdge { from, to } => slot.from >= from && slot.from < to,
        }
    }

    /// PostgREST query fragment (`column=op.value` pairs joined by `&`).
    pub fn to_query(&self) -> String {
        let ts = |value: DateTime<Utc>| value.to_rfc3339_opts(SecondsFormat::Secs, true);
        match *self {
            SlotFilter::ContainedIn { from, to } => format!("from=gte.{}&to=lte.{}", ts(from), ts(to)),
            SlotFilter::Touching { from, to } => format!("from=lte.{}&to=gte.{}", ts(to), ts(from)),
            SlotFilter::Encloses { from, to } => format!("from=lt.{}&to=gt.{}", ts(from), ts(to)),
            SlotFilter::LeftEdge { from, to } => format!("to=gt.{}&to=lte.{}", ts(from), ts(to)),
            SlotFilter::RightEdge { from, to } => format!("from=gte.{}&from=lt.{}", ts(from), ts(to)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::test_utils::{at, on};

    fn slot(from: &str, to: &str) -> TimeSlot {
        NewTimeSlot { doctor_id: "DOC-1".to_string(), from: at(from), to: at(to) }.into_time_slot()
    }

    #[test]
    fn test_request_parse_rejects_bad_input() {
        assert_eq!(
            TimeSlotRequest::new("2025-03-10 09:00", "2025-03-10T10:00").parse(),
            Err(TimeSlotError::InvalidRange("from must be in the format 'YYYY-MM-DDTHH:mm'".to_string()))
        );
        assert_eq!(
            TimeSlotRequest::new("2025-03-10T10:00", "2025-03-10T10:00").parse(),
            Err(TimeSlotError::InvalidRange("'from' must be before 'to'".to_string()))
        );
        assert_eq!(
            TimeSlotRequest::new("2025-03-10T10:00", "2025-03-10T25:00").parse(),
            Err(TimeSlotError::InvalidRange("'from' and 'to' must be valid dates".to_string()))
        );
    }

    #[test]
    fn test_request_with_missing_or_non_string_bound_is_a_format_error() {
        let missing: TimeSlotRequest = serde_json::from_value(serde_json::json!({ "from": "2025-03-10T09:00" })).unwrap();
        assert_eq!(
            missing.parse(),
            Err(TimeSlotError::InvalidRange("to must be in the format 'YYYY-MM-DDTHH:mm'".to_string()))
        );

        let numeric: TimeSlotRequest =
            serde_json::from_value(serde_json::json!({ "from": 900, "to": "2025-03-10T10:00" })).unwrap();
        assert_eq!(
            numeric.parse(),
            Err(TimeSlotError::InvalidRange("from must be in the format 'YYYY-MM-DDTHH:mm'".to_string()))
        );
    }

    #[test]
    fn test_query_defaults_to_one_day_from_midnight() {
        let now = on("2025-03-10", "14:25");
        let (from, to) = TimeSlotQuery::default().resolve(now).unwrap();
        assert_eq!(from, on("2025-03-10", "00:00"));
        assert_eq!(to, on("2025-03-11", "00:00"));

        let query = TimeSlotQuery { from: Some("2025-03-12".to_string()), to: None };
        let (from, to) = query.resolve(now).unwrap();
        assert_eq!(from, on("2025-03-12", "00:00"));
        assert_eq!(to, on("2025-03-13", "00:00"));
    }

    #[test]
    fn test_query_rejects_bad_date() {
        let query = TimeSlotQuery { from: None, to: Some("10.3.2025".to_string()) };
        assert!(matches!(query.resolve(Utc::now()), Err(TimeSlotError::InvalidRange(_))));
    }

    #[test]
    fn test_filters_at_shared_endpoints() {
        let stored = slot("09:00", "10:00");

        // adjacent on either side counts as touching
        assert!(SlotFilter::Touching { from: at("10:00"), to: at("11:00") }.matches(&stored));
        assert!(SlotFilter::Touching { from: at("08:00"), to: at("09:00") }.matches(&stored));
        assert!(!SlotFilter::Touching { from: at("10:01"), to: at("11:00") }.matches(&stored));

        // but never as an edge overlap
        assert!(!SlotFilter::LeftEdge { from: at("10:00"), to: at("11:00") }.matches(&stored));
        assert!(!SlotFilter::RightEdge { from: at("08:00"), to: at("09:00") }.matches(&stored));

        assert!(SlotFilter::ContainedIn { from: at("09:00"), to: at("10:00") }.matches(&stored));
        assert!(!SlotFilter::Encloses { from: at("09:00"), to: at("09:30") }.matches(&stored));
        assert!(SlotFilter::Encloses { from: at("09:15"), to: at("09:30") }.matches(&stored));
    }

    #[test]
    fn test_filter_query_strings() {
        let filter = SlotFilter::LeftEdge { from: at("09:00"), to: at("10:00") };
        assert_eq!(filter.to_query(), "to=gt.2025-03-10T09:00:00Z&to=lte.2025-03-10T10:00:00Z");
    }
}
