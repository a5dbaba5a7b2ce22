//! Time source for drawing-schedule decisions.
//!
//! Drawings happen Monday, Wednesday and Saturday at 22:59 in the lottery's
//! official timezone (America/New_York). The clock is a port so tests can
//! freeze time.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;

/// Hour (24h, official timezone) at which the drawing closes.
const DRAWING_HOUR: u32 = 22;
/// Minute at which the drawing closes.
const DRAWING_MINUTE: u32 = 59;

pub trait LotteryClock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Whether `date` is a scheduled drawing day.
    fn is_drawing_day(&self, date: NaiveDate) -> bool {
        matches!(
            date.weekday(),
            Weekday::Mon | Weekday::Wed | Weekday::Sat
        )
    }

    /// The most recent scheduled drawing day at or before today in the
    /// official timezone. The day's drawing time may not have passed yet;
    /// callers check that separately via [`drawing_has_occurred`].
    ///
    /// [`drawing_has_occurred`]: LotteryClock::drawing_has_occurred
    fn latest_drawing_day(&self) -> NaiveDate {
        let mut date = self.now().with_timezone(&New_York).date_naive();
        while !self.is_drawing_day(date) {
            date = date.pred_opt().expect("date underflow");
        }
        date
    }

    /// The next scheduled drawing day whose drawing has not happened yet.
    /// Today counts while its drawing time is still ahead.
    fn next_drawing_day(&self) -> NaiveDate {
        let mut date = self.now().with_timezone(&New_York).date_naive();
        loop {
            if self.is_drawing_day(date) && !self.drawing_has_occurred(date) {
                return date;
            }
            date = date.succ_opt().expect("date overflow");
        }
    }

    /// Whether the official drawing time for `date` has passed.
    fn drawing_has_occurred(&self, date: NaiveDate) -> bool {
        let drawing_time = New_York
            .from_local_datetime(
                &date
                    .and_hms_opt(DRAWING_HOUR, DRAWING_MINUTE, 0)
                    .expect("valid drawing time"),
            )
            .single();
        match drawing_time {
            Some(t) => self.now() >= t.with_timezone(&Utc),
            // DST edge: treat an ambiguous local time as already passed.
            None => true,
        }
    }
}

/// Wall-clock implementation.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl LotteryClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock for tests.
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl LotteryClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
