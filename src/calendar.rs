//! Day and week boundaries in the user's timezone

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

/// Calendar anchored to a fixed UTC offset.
///
/// Timestamps are stored in UTC; every "which day / which week" question is
/// answered in local time through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar for a whole-hour offset east of UTC (e.g. 3 for Moscow).
    /// Returns `None` for offsets outside ±23 hours.
    pub fn with_offset_hours(hours: i32) -> Option<Self> {
        hours.checked_mul(3600).and_then(FixedOffset::east_opt).map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Offset in seconds, as SQLite date modifiers want it
    pub fn offset_secs(&self) -> i32 {
        self.offset.local_minus_utc()
    }

    /// Local calendar date of a timestamp
    pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// Instant of local midnight starting `date`
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN);
        // A fixed offset has no gaps, so the mapping is always single
        (local - Duration::seconds(i64::from(self.offset_secs()))).and_utc()
    }

    /// Monday of the week containing `date`
    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
    }

    /// Instant the week containing `ts` began
    pub fn start_of_week(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of_day(self.week_start(self.day_of(ts)))
    }

    /// January 1st of the year containing `ts`, as an instant
    pub fn start_of_year(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let day = self.day_of(ts);
        let jan1 = NaiveDate::from_ymd_opt(day.year(), 1, 1).unwrap_or(day);
        self.start_of_day(jan1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        let cal = Calendar::utc();
        // 2026-10-18 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(cal.week_start(sunday), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(cal.week_start(monday), monday);
    }

    #[test]
    fn test_offset_moves_day_boundary() {
        let moscow = Calendar::with_offset_hours(3).unwrap();
        // 22:00 UTC is already the next day in Moscow
        assert_eq!(moscow.day_of(ts(2026, 10, 18, 22)), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(
            moscow.start_of_day(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()),
            ts(2026, 10, 18, 21)
        );
    }

    #[test]
    fn test_start_of_week_and_year() {
        let cal = Calendar::utc();
        assert_eq!(cal.start_of_week(ts(2026, 10, 21, 15)), ts(2026, 10, 19, 0));
        assert_eq!(cal.start_of_year(ts(2026, 10, 21, 15)), ts(2026, 1, 1, 0));
    }

    #[test]
    fn test_invalid_offset() {
        assert!(Calendar::with_offset_hours(30).is_none());
        assert!(Calendar::with_offset_hours(-24).is_none());
        // Would overflow i32 seconds
        assert!(Calendar::with_offset_hours(600_000).is_none());
        assert!(Calendar::with_offset_hours(i32::MIN).is_none());
    }

    #[test]
    fn test_negative_offset() {
        let new_york = Calendar::with_offset_hours(-5).unwrap();
        assert_eq!(new_york.offset_secs(), -5 * 3600);
        // 03:00 UTC is still the previous evening at UTC-5
        assert_eq!(new_york.day_of(ts(2026, 10, 19, 3)), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    }
}
