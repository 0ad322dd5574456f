use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The UTC day covering `date`, midnight to midnight. `None` for the last
/// date chrono can represent, whose next midnight does not exist.
pub fn utc_day_window(date: NaiveDate) -> Option<DayWindow> {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = start.checked_add_signed(Duration::hours(24))?;
    Some(DayWindow { start, end })
}

/// English weekday name as stored in the schedule table.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
