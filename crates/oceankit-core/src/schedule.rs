//! Maintenance window value object
//!
//! Managed resources advertise a weekly maintenance window: a day of week
//! (or "any day") paired with a wall-clock start time. On the wire the
//! window is UTC; callers working in a local offset convert through
//! [`MaintenanceWindow::from_offset`] and
//! [`MaintenanceWindow::in_offset`].

use crate::error::{Error, Result};
use chrono::{Duration as TimeDelta, FixedOffset, NaiveTime, Timelike, Weekday};

/// A weekly maintenance window, normalized to UTC
///
/// The start time must have zero seconds and zero sub-seconds; an absent
/// day means "any day". Whether "any" is acceptable depends on the
/// resource kind (Kubernetes accepts it, databases do not) and is enforced
/// by the resource crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceWindow {
    day: Option<Weekday>,
    start: NaiveTime,
}

impl MaintenanceWindow {
    /// Window on a specific day, start time already UTC
    pub fn on(day: Weekday, start: NaiveTime) -> Result<Self> {
        Self::validated(Some(day), start)
    }

    /// Window on any day, start time already UTC
    pub fn any_day(start: NaiveTime) -> Result<Self> {
        Self::validated(None, start)
    }

    fn validated(day: Option<Weekday>, start: NaiveTime) -> Result<Self> {
        if start.second() != 0 || start.nanosecond() != 0 {
            return Err(Error::validation(format!(
                "maintenance window start must be a whole minute, got {start}"
            )));
        }
        Ok(Self { day, start })
    }

    /// Build a window from a caller-supplied offset-aware wall time,
    /// normalizing to UTC
    ///
    /// When the conversion crosses midnight the day shifts accordingly.
    pub fn from_offset(
        day: Option<Weekday>,
        start: NaiveTime,
        offset: FixedOffset,
    ) -> Result<Self> {
        let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        // a positive remainder from the subtraction means the UTC moment
        // falls on the previous day
        let (utc_start, wrapped) = start.overflowing_sub_signed(shift);
        let utc_day = day.map(|d| match wrapped {
            w if w > 0 => d.pred(),
            w if w < 0 => d.succ(),
            _ => d,
        });
        Self::validated(utc_day, utc_start)
    }

    /// View the window in a caller-supplied offset
    pub fn in_offset(&self, offset: FixedOffset) -> (Option<Weekday>, NaiveTime) {
        let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        let (local_start, wrapped) = self.start.overflowing_add_signed(shift);
        let local_day = self.day.map(|d| match wrapped {
            w if w > 0 => d.succ(),
            w if w < 0 => d.pred(),
            _ => d,
        });
        (local_day, local_start)
    }

    /// Parse the wire representation (`"any"`/weekday name plus `"HH:MM"`
    /// or `"HH:MM:SS"`)
    pub fn from_wire(day: &str, start: &str) -> Result<Self> {
        let day = match day {
            "any" => None,
            other => Some(parse_day(other)?),
        };
        let start = NaiveTime::parse_from_str(start, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(start, "%H:%M:%S"))
            .map_err(|_| {
                Error::protocol(format!("unparseable maintenance window start {start:?}"))
            })?;
        Self::validated(day, start)
    }

    pub fn day(&self) -> Option<Weekday> {
        self.day
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Wire form of the day: a lowercase weekday name, or `"any"`
    pub fn day_str(&self) -> &'static str {
        match self.day {
            None => "any",
            Some(Weekday::Mon) => "monday",
            Some(Weekday::Tue) => "tuesday",
            Some(Weekday::Wed) => "wednesday",
            Some(Weekday::Thu) => "thursday",
            Some(Weekday::Fri) => "friday",
            Some(Weekday::Sat) => "saturday",
            Some(Weekday::Sun) => "sunday",
        }
    }

    /// Wire form of the start time, `"HH:MM"`
    pub fn start_hhmm(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

fn parse_day(raw: &str) -> Result<Weekday> {
    match raw {
        "monday" => Ok(Weekday::Mon),
        "tuesday" => Ok(Weekday::Tue),
        "wednesday" => Ok(Weekday::Wed),
        "thursday" => Ok(Weekday::Thu),
        "friday" => Ok(Weekday::Fri),
        "saturday" => Ok(Weekday::Sat),
        "sunday" => Ok(Weekday::Sun),
        other => Err(Error::protocol(format!(
            "unknown maintenance window day {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn rejects_non_zero_seconds() {
        assert!(MaintenanceWindow::on(Weekday::Mon, time(4, 0, 30)).is_err());
        assert!(MaintenanceWindow::on(Weekday::Mon, time(4, 30, 0)).is_ok());
    }

    #[test]
    fn offset_conversion_normalizes_to_utc() {
        // 01:00 Monday at UTC+2 is 23:00 Sunday UTC
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let window =
            MaintenanceWindow::from_offset(Some(Weekday::Mon), time(1, 0, 0), offset).unwrap();
        assert_eq!(window.day(), Some(Weekday::Sun));
        assert_eq!(window.start(), time(23, 0, 0));

        // and converts back
        let (day, start) = window.in_offset(offset);
        assert_eq!(day, Some(Weekday::Mon));
        assert_eq!(start, time(1, 0, 0));
    }

    #[test]
    fn offset_conversion_keeps_any_day() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let window = MaintenanceWindow::from_offset(None, time(22, 0, 0), offset).unwrap();
        assert_eq!(window.day(), None);
        assert_eq!(window.start(), time(3, 0, 0));
    }

    #[test]
    fn wire_round_trip() {
        let window = MaintenanceWindow::from_wire("tuesday", "04:00").unwrap();
        assert_eq!(window.day_str(), "tuesday");
        assert_eq!(window.start_hhmm(), "04:00");

        let window = MaintenanceWindow::from_wire("any", "16:30:00").unwrap();
        assert_eq!(window.day_str(), "any");
        assert_eq!(window.start_hhmm(), "16:30");

        assert!(MaintenanceWindow::from_wire("someday", "04:00").is_err());
        assert!(MaintenanceWindow::from_wire("monday", "4 o'clock").is_err());
    }
}
