use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Half-open `[start, end)` interval every query of a run is filtered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReconciliationRange {
    pub start: NaiveDateTime,
    /// Exclusive: midnight after the last calendar day.
    pub end: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeError {
    /// `start` falls after `end`.
    Inverted { start: NaiveDate, end: NaiveDate },
    /// The day after `end` is not representable.
    OutOfRange { end: NaiveDate },
}

impl std::fmt::Display for RangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeError::Inverted { start, end } => {
                write!(f, "start date {start} is after end date {end}")
            }
            RangeError::OutOfRange { end } => {
                write!(f, "end date {end} has no following day")
            }
        }
    }
}

impl std::error::Error for RangeError {}

impl ReconciliationRange {
    /// Inclusive calendar days `start..=end` as `[start 00:00:00, end+1 00:00:00)`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        let after_end = end.succ_opt().ok_or(RangeError::OutOfRange { end })?;
        Ok(Self {
            start: start.and_time(NaiveTime::MIN),
            end: after_end.and_time(NaiveTime::MIN),
        })
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts < self.end
    }
}

impl std::fmt::Display for ReconciliationRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn end_of_day_is_inside_and_next_midnight_is_not() {
        let r = ReconciliationRange::from_dates(d(2025, 11, 21), d(2025, 11, 23)).unwrap();
        let last = d(2025, 11, 23).and_hms_opt(23, 59, 59).unwrap();
        let next = d(2025, 11, 24).and_hms_opt(0, 0, 0).unwrap();
        let first = d(2025, 11, 21).and_hms_opt(0, 0, 0).unwrap();

        assert!(r.contains(first));
        assert!(r.contains(last));
        assert!(!r.contains(next));
        assert_eq!(r.end, next);
    }

    #[test]
    fn single_day_range_spans_one_day() {
        let r = ReconciliationRange::from_dates(d(2025, 12, 31), d(2025, 12, 31)).unwrap();
        assert_eq!(r.end - r.start, chrono::Duration::days(1));
        assert_eq!(r.end.date(), d(2026, 1, 1));
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let err = ReconciliationRange::from_dates(d(2025, 11, 23), d(2025, 11, 21)).unwrap_err();
        assert!(matches!(err, RangeError::Inverted { .. }));
    }

    #[test]
    fn max_date_has_no_exclusive_end() {
        let err = ReconciliationRange::from_dates(NaiveDate::MAX, NaiveDate::MAX).unwrap_err();
        assert_eq!(err, RangeError::OutOfRange { end: NaiveDate::MAX });
    }
}
