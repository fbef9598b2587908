use crate::error::MetricsError;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single scalar observation.
///
/// Timestamps are kept at millisecond precision, the precision of the
/// stored representation, so that a point read back from a bucket compares
/// equal to the point that was written.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Datapoint {
    #[serde(with = "timestamp_format")]
    #[schema(value_type = String, example = "2017-07-03T00:00:00.000Z")]
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Datapoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(3),
            value,
        }
    }

    /// The UTC calendar day owning this datapoint.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// A datapoint as submitted by a caller, before its timestamp is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawDatapoint {
    #[schema(example = "2017-07-03T00:00:00.000Z")]
    pub timestamp: String,
    pub value: f64,
}

impl RawDatapoint {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }

    pub fn parse(&self) -> Result<Datapoint, MetricsError> {
        Ok(Datapoint::new(parse_timestamp(&self.timestamp)?, self.value))
    }
}

impl From<&Datapoint> for RawDatapoint {
    fn from(point: &Datapoint) -> Self {
        Self::new(format_timestamp(&point.timestamp), point.value)
    }
}

/// Parses an ISO-8601 instant with an explicit offset, normalised to UTC.
pub fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, MetricsError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|datetime| datetime.with_timezone(&Utc).trunc_subsecs(3))
        .map_err(|_| MetricsError::Format(timestamp.to_string()))
}

/// `2017-07-03T00:00:00.000Z`
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

mod timestamp_format {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s).map_err(D::Error::custom)
    }
}
