//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Negative if `other` is after `self`.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by adding the specified number of minutes.
    pub fn add_minutes(&self, minutes: i64) -> Self {
        Self(self.0 + Duration::minutes(minutes))
    }

    /// Creates a new timestamp by subtracting the specified number of minutes.
    pub fn minus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 - Duration::minutes(minutes))
    }

    /// Creates a new timestamp by adding calendar months.
    ///
    /// Saturates at the end of the target month (Jan 31 + 1 month = Feb 28/29).
    pub fn add_months(&self, months: u32) -> Self {
        Self(self.0 + Months::new(months))
    }

    /// Parses an RFC 3339 timestamp string.
    pub fn parse_rfc3339(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_works() {
        let earlier = Timestamp::now();
        let later = earlier.add_minutes(5);
        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
    }

    #[test]
    fn add_months_uses_calendar_months() {
        let jan31 = Timestamp::parse_rfc3339("2024-01-31T12:00:00Z").unwrap();
        let plus_one = jan31.add_months(1);
        // 2024 is a leap year, so Jan 31 + 1 month saturates to Feb 29.
        assert_eq!(
            plus_one.as_datetime().to_rfc3339(),
            "2024-02-29T12:00:00+00:00"
        );
    }

    #[test]
    fn parse_rfc3339_accepts_offsets() {
        let ts = Timestamp::parse_rfc3339("2024-06-01T10:00:00+01:00").unwrap();
        assert_eq!(
            ts.as_datetime().to_rfc3339(),
            "2024-06-01T09:00:00+00:00"
        );
    }

    #[test]
    fn parse_rfc3339_rejects_garbage() {
        assert!(Timestamp::parse_rfc3339("yesterday").is_none());
    }

    #[test]
    fn duration_since_is_signed() {
        let a = Timestamp::now();
        let b = a.add_minutes(30);
        assert_eq!(b.duration_since(&a).num_minutes(), 30);
        assert_eq!(a.duration_since(&b).num_minutes(), -30);
    }
}
