use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DeserializeAs, SerializeAs};
use std::collections::BTreeMap;
use thiserror::Error;

type Result<T> = std::result::Result<T, CalendarError>;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("failed to parse submission calendar")]
    ParseError(#[from] serde_json::Error),
    #[error("invalid calendar timestamp `{0}`")]
    InvalidTimestamp(String),
}

/// Submission counts keyed by the unix timestamp (seconds, day granularity) of the day.
///
/// Upstream sends this map as a JSON-encoded string, so deserialization accepts
/// either that string or a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionCalendar(pub BTreeMap<String, u32>);

impl SubmissionCalendar {
    pub fn parse(raw: &str) -> Result<Self> {
        let counts: BTreeMap<String, u32> = serde_json::from_str(raw)?;
        Ok(SubmissionCalendar(counts))
    }
}

impl<'de> Deserialize<'de> for SubmissionCalendar {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Encoded(String),
            Map(BTreeMap<String, u32>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Encoded(raw) => SubmissionCalendar::parse(&raw).map_err(de::Error::custom),
            Raw::Map(counts) => Ok(SubmissionCalendar(counts)),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    #[serde_as(as = "IsoDate")]
    pub date: NaiveDate,
    pub count: u32,
}

/// `YYYY-MM-DD` representation of a calendar date.
pub struct IsoDate;

impl SerializeAs<NaiveDate> for IsoDate {
    fn serialize_as<S>(source: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&source.format("%Y-%m-%d").to_string())
    }
}

impl<'de> DeserializeAs<'de, NaiveDate> for IsoDate {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| de::Error::custom(e.to_string()))
    }
}

/// First day of the month one year before `today`.
pub fn rolling_window_cutoff(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year() - 1, today.month(), 1).unwrap_or(today)
}

fn to_date(timestamp: &str) -> Result<NaiveDate> {
    let seconds: i64 = timestamp
        .parse()
        .map_err(|_| CalendarError::InvalidTimestamp(timestamp.to_string()))?;

    Utc.timestamp_opt(seconds, 0)
        .single()
        .map(|datetime| datetime.date_naive())
        .ok_or_else(|| CalendarError::InvalidTimestamp(timestamp.to_string()))
}

/// Converts the calendar into date entries on or after `cutoff`, sorted ascending by date.
///
/// Timestamps falling on the same UTC day are folded into one entry holding their sum.
pub fn normalize(calendar: &SubmissionCalendar, cutoff: NaiveDate) -> Result<Vec<CalendarEntry>> {
    let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for (timestamp, count) in calendar.0.iter() {
        let date = to_date(timestamp)?;
        if date >= cutoff {
            let total = counts.entry(date).or_default();
            *total = total.saturating_add(*count);
        }
    }

    Ok(counts
        .into_iter()
        .map(|(date, count)| CalendarEntry { date, count })
        .collect())
}

/// Joins the normalized calendars of two consecutive years.
///
/// A date present in both keeps the entry from `this_year`.
pub fn merge(last_year: Vec<CalendarEntry>, this_year: Vec<CalendarEntry>) -> Vec<CalendarEntry> {
    let mut merged: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for entry in last_year.into_iter().chain(this_year) {
        merged.insert(entry.date, entry.count);
    }

    merged
        .into_iter()
        .map(|(date, count)| CalendarEntry { date, count })
        .collect()
}
