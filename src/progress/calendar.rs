/// Calendar and time helpers
///
/// Pure conversions between calendar dates and instants in an explicit time
/// zone, plus weekday and period arithmetic. "Now" is never read here; it is
/// handed in through a `Clock`.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc, Weekday};

use crate::domain::Frequency;

/// Source of the current instant
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;

    /// Local calendar date of `now`
    fn today(&self) -> NaiveDate {
        to_date(&self.now())
    }
}

/// Reads the device clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone)]
pub struct FixedClock<Tz: TimeZone> {
    now: DateTime<Tz>,
}

impl<Tz: TimeZone> FixedClock<Tz> {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }
}

impl FixedClock<Utc> {
    /// Clock pinned to a UTC wall-clock time, mostly for tests
    pub fn utc(date: NaiveDate, hour: u32, minute: u32) -> Self {
        let naive = date.and_hms_opt(hour, minute, 0).unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
        Self::new(Utc.from_utc_datetime(&naive))
    }
}

impl<Tz: TimeZone> Clock for FixedClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.now.clone()
    }
}

/// Start of `date` in `tz`.
///
/// If local midnight is skipped by a DST transition the first existing
/// instant of the day is returned instead.
pub fn to_day_instant<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    // Gaps are at most a couple of hours; step forward 15 minutes at a time.
    for step in 0..=12 {
        let candidate = midnight + Duration::minutes(15 * step);
        if let Some(instant) = tz.from_local_datetime(&candidate).earliest() {
            return instant;
        }
    }
    tz.from_utc_datetime(&midnight)
}

/// Local calendar date of an instant
pub fn to_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

pub fn is_same_or_after(date: NaiveDate, other: NaiveDate) -> bool {
    date >= other
}

pub fn day_of_week(date: NaiveDate) -> Weekday {
    date.weekday()
}

/// First `weekday` on or after `date`
pub fn next_or_same(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() as i64
        - date.weekday().num_days_from_monday() as i64)
        % 7;
    date + Duration::days(ahead)
}

/// First `weekday` strictly after `date`
pub fn next(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    next_or_same(date + Duration::days(1), weekday)
}

/// Last `weekday` on or before `date`
pub fn previous_or_same(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let behind = (7 + date.weekday().num_days_from_monday() as i64
        - weekday.num_days_from_monday() as i64)
        % 7;
    date - Duration::days(behind)
}

/// First day of the period containing `date`
pub fn period_start(frequency: Frequency, date: NaiveDate, first_day_of_week: Weekday) -> NaiveDate {
    match frequency {
        Frequency::Daily => date,
        Frequency::Weekly => previous_or_same(date, first_day_of_week),
        Frequency::Monthly => date.with_day(1).unwrap_or(date),
        Frequency::Yearly => date.with_ordinal(1).unwrap_or(date),
    }
}
