//! Sparse per-unit date component records.

use crate::unit::{CalendarUnit, UnitSet, UNITS_DESCENDING};

/// A sparse record of calendar unit values.
///
/// Every field is either a concrete value or unset. A `DateComponents` is
/// used both as a pattern (enumeration input, where only the set fields
/// participate in matching) and as a decomposition result (where the
/// requested fields are filled in). The leap month flag is tri-state:
/// unset, explicitly false, or explicitly true.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateComponents {
    pub era: Option<i64>,
    pub year: Option<i64>,
    pub quarter: Option<i64>,
    pub month: Option<i64>,
    pub leap_month: Option<bool>,
    pub day: Option<i64>,
    pub hour: Option<i64>,
    pub minute: Option<i64>,
    pub second: Option<i64>,
    pub nanosecond: Option<i64>,
    pub weekday: Option<i64>,
    pub weekday_ordinal: Option<i64>,
    pub week_of_month: Option<i64>,
    pub week_of_year: Option<i64>,
    pub year_for_week_of_year: Option<i64>,
}

impl DateComponents {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            era: None,
            year: None,
            quarter: None,
            month: None,
            leap_month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            nanosecond: None,
            weekday: None,
            weekday_ordinal: None,
            week_of_month: None,
            week_of_year: None,
            year_for_week_of_year: None,
        }
    }

    /// Zeroes the time-of-day fields.
    pub(crate) fn clear_time(&mut self) {
        self.hour = Some(0);
        self.minute = Some(0);
        self.second = Some(0);
        self.nanosecond = Some(0);
    }

    /// Reads the value recorded for `unit`, if any.
    #[must_use]
    pub fn value_for(&self, unit: CalendarUnit) -> Option<i64> {
        match unit {
            CalendarUnit::Era => self.era,
            CalendarUnit::Year => self.year,
            CalendarUnit::YearForWeekOfYear => self.year_for_week_of_year,
            CalendarUnit::Quarter => self.quarter,
            CalendarUnit::WeekOfYear => self.week_of_year,
            CalendarUnit::Month => self.month,
            CalendarUnit::WeekOfMonth => self.week_of_month,
            CalendarUnit::WeekdayOrdinal => self.weekday_ordinal,
            CalendarUnit::Weekday => self.weekday,
            CalendarUnit::Day => self.day,
            CalendarUnit::Hour => self.hour,
            CalendarUnit::Minute => self.minute,
            CalendarUnit::Second => self.second,
            CalendarUnit::Nanosecond => self.nanosecond,
        }
    }

    /// Sets or clears the value for `unit`.
    pub fn set_value(&mut self, unit: CalendarUnit, value: Option<i64>) {
        let slot = match unit {
            CalendarUnit::Era => &mut self.era,
            CalendarUnit::Year => &mut self.year,
            CalendarUnit::YearForWeekOfYear => &mut self.year_for_week_of_year,
            CalendarUnit::Quarter => &mut self.quarter,
            CalendarUnit::WeekOfYear => &mut self.week_of_year,
            CalendarUnit::Month => &mut self.month,
            CalendarUnit::WeekOfMonth => &mut self.week_of_month,
            CalendarUnit::WeekdayOrdinal => &mut self.weekday_ordinal,
            CalendarUnit::Weekday => &mut self.weekday,
            CalendarUnit::Day => &mut self.day,
            CalendarUnit::Hour => &mut self.hour,
            CalendarUnit::Minute => &mut self.minute,
            CalendarUnit::Second => &mut self.second,
            CalendarUnit::Nanosecond => &mut self.nanosecond,
        };
        *slot = value;
    }

    /// The set of units carrying a concrete value.
    #[must_use]
    pub fn set_units(&self) -> UnitSet {
        UNITS_DESCENDING
            .into_iter()
            .filter(|u| self.value_for(*u).is_some())
            .collect()
    }

    /// The coarsest unit with a concrete value.
    #[must_use]
    pub fn highest_set_unit(&self) -> Option<CalendarUnit> {
        self.set_units().highest()
    }

    /// The finest unit with a concrete value.
    #[must_use]
    pub fn lowest_set_unit(&self) -> Option<CalendarUnit> {
        self.set_units().lowest()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_units().is_empty() && self.leap_month.is_none()
    }

    // Builder-style setters for the common pattern fields.

    #[must_use]
    pub const fn with_era(mut self, era: i64) -> Self {
        self.era = Some(era);
        self
    }

    #[must_use]
    pub const fn with_year(mut self, year: i64) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub const fn with_quarter(mut self, quarter: i64) -> Self {
        self.quarter = Some(quarter);
        self
    }

    #[must_use]
    pub const fn with_month(mut self, month: i64) -> Self {
        self.month = Some(month);
        self
    }

    #[must_use]
    pub const fn with_leap_month(mut self, leap: bool) -> Self {
        self.leap_month = Some(leap);
        self
    }

    #[must_use]
    pub const fn with_day(mut self, day: i64) -> Self {
        self.day = Some(day);
        self
    }

    #[must_use]
    pub const fn with_hour(mut self, hour: i64) -> Self {
        self.hour = Some(hour);
        self
    }

    #[must_use]
    pub const fn with_minute(mut self, minute: i64) -> Self {
        self.minute = Some(minute);
        self
    }

    #[must_use]
    pub const fn with_second(mut self, second: i64) -> Self {
        self.second = Some(second);
        self
    }

    #[must_use]
    pub const fn with_nanosecond(mut self, nanosecond: i64) -> Self {
        self.nanosecond = Some(nanosecond);
        self
    }

    #[must_use]
    pub const fn with_weekday(mut self, weekday: i64) -> Self {
        self.weekday = Some(weekday);
        self
    }

    #[must_use]
    pub const fn with_weekday_ordinal(mut self, ordinal: i64) -> Self {
        self.weekday_ordinal = Some(ordinal);
        self
    }

    #[must_use]
    pub const fn with_week_of_month(mut self, week: i64) -> Self {
        self.week_of_month = Some(week);
        self
    }

    #[must_use]
    pub const fn with_week_of_year(mut self, week: i64) -> Self {
        self.week_of_year = Some(week);
        self
    }

    #[must_use]
    pub const fn with_year_for_week_of_year(mut self, year: i64) -> Self {
        self.year_for_week_of_year = Some(year);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_units_tracks_fields() {
        let comps = DateComponents::new().with_month(2).with_day(29);
        let set = comps.set_units();
        assert!(set.contains(CalendarUnit::Month));
        assert!(set.contains(CalendarUnit::Day));
        assert!(!set.contains(CalendarUnit::Year));
        assert_eq!(comps.highest_set_unit(), Some(CalendarUnit::Month));
        assert_eq!(comps.lowest_set_unit(), Some(CalendarUnit::Day));
    }

    #[test]
    fn leap_month_is_not_a_unit() {
        let comps = DateComponents::new().with_leap_month(true);
        assert!(comps.set_units().is_empty());
        assert!(!comps.is_empty());
    }

    #[test]
    fn value_round_trip() {
        let mut comps = DateComponents::new();
        for unit in UNITS_DESCENDING {
            comps.set_value(unit, Some(unit as i64 + 1));
        }
        for unit in UNITS_DESCENDING {
            assert_eq!(comps.value_for(unit), Some(unit as i64 + 1));
        }
        comps.set_value(CalendarUnit::Hour, None);
        assert_eq!(comps.value_for(CalendarUnit::Hour), None);
    }
}
