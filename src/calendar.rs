//! The public `Calendar` type: configuration plus component operations.

use icu_calendar::AnyCalendarKind;

use crate::{
    backend::{Backend, Cursor},
    components::DateComponents,
    error::CalendarError,
    fields::Field,
    options::AddOptions,
    ordinality::{quarter_of_month, quarter_start_month},
    timezone::TimeZone,
    unit::{CalendarUnit, UnitSet, UNITS_DESCENDING},
    utils::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND},
    CalendarResult, CalendarUnwrap,
};

use core_maths::*;

/// Identifies a calendar system.
pub type CalendarKind = AnyCalendarKind;

/// A calendar: a calendar system, a time zone, and week configuration.
///
/// All state is owned by value; every query runs on a function-local cursor,
/// so a `Calendar` has no hidden scratch state and property setters simply
/// replace the owned configuration.
#[derive(Debug, Clone)]
pub struct Calendar {
    backend: Backend,
    gregorian_start: Option<f64>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(CalendarKind::Gregorian)
    }
}

impl Calendar {
    /// Creates a calendar of `kind` in UTC with Sunday weeks.
    #[must_use]
    pub const fn new(kind: CalendarKind) -> Self {
        Self {
            backend: Backend::new(kind, TimeZone::utc()),
            gregorian_start: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CalendarKind {
        self.backend.kind()
    }

    #[must_use]
    pub fn time_zone(&self) -> &TimeZone {
        &self.backend.tz
    }

    pub fn set_time_zone(&mut self, tz: TimeZone) {
        self.backend.tz = tz;
    }

    #[must_use]
    pub fn with_time_zone(mut self, tz: TimeZone) -> Self {
        self.set_time_zone(tz);
        self
    }

    /// First weekday, 1 = Sunday through 7 = Saturday.
    #[must_use]
    pub fn first_weekday(&self) -> u8 {
        self.backend.first_weekday
    }

    pub fn set_first_weekday(&mut self, weekday: u8) -> CalendarResult<()> {
        if !(1..=7).contains(&weekday) {
            return Err(CalendarError::range().with_message("weekday must be 1 through 7"));
        }
        self.backend.first_weekday = weekday;
        Ok(())
    }

    #[must_use]
    pub fn min_days_in_first_week(&self) -> u8 {
        self.backend.min_days_in_first_week
    }

    pub fn set_min_days_in_first_week(&mut self, days: u8) -> CalendarResult<()> {
        if !(1..=7).contains(&days) {
            return Err(CalendarError::range().with_message("minimum days must be 1 through 7"));
        }
        self.backend.min_days_in_first_week = days;
        Ok(())
    }

    /// The Gregorian cutover instant, for callers that track one. Stored and
    /// reported; arithmetic is proleptic.
    #[must_use]
    pub fn gregorian_start(&self) -> Option<f64> {
        self.gregorian_start
    }

    pub fn set_gregorian_start(&mut self, at: Option<f64>) {
        self.gregorian_start = at;
    }

    #[inline]
    pub(crate) fn backend(&self) -> &Backend {
        &self.backend
    }

    pub(crate) fn cursor_at(&self, at: f64) -> CalendarResult<Cursor<'_>> {
        self.backend.cursor(ms_from_abs(at))
    }
}

// ==== Absolute time conversions ====

/// Absolute time (seconds since the Unix epoch) to epoch milliseconds.
pub(crate) fn ms_from_abs(at: f64) -> i64 {
    (at * 1_000.0).floor() as i64
}

/// Epoch milliseconds back to absolute time.
pub(crate) fn abs_from_ms(ms: i64) -> f64 {
    ms as f64 / 1_000.0
}

// ==== Component operations ====

impl Calendar {
    /// The value of one unit at `at`, or `None` where the unit cannot be
    /// computed.
    #[must_use]
    pub fn component(&self, unit: CalendarUnit, at: f64) -> Option<i64> {
        let cursor = self.cursor_at(at).ok()?;
        match unit {
            CalendarUnit::Quarter => {
                let month = cursor.get(Field::Month).ok()?;
                Some(quarter_of_month(self.kind(), month))
            }
            CalendarUnit::Nanosecond => Some(nanosecond_of(at)),
            _ => {
                let field = Field::of_unit(unit)?;
                cursor.get(field).ok()
            }
        }
    }

    /// Decomposes `at` into the requested units in one backend round trip.
    pub fn decompose(&self, units: UnitSet, at: f64) -> CalendarResult<DateComponents> {
        let cursor = self.cursor_at(at)?;
        let mut comps = DateComponents::new();
        for unit in units.iter() {
            let value = match unit {
                CalendarUnit::Quarter => {
                    quarter_of_month(self.kind(), cursor.get(Field::Month)?)
                }
                CalendarUnit::Nanosecond => nanosecond_of(at),
                CalendarUnit::Month => {
                    comps.leap_month = Some(cursor.is_leap_month());
                    cursor.month_number()
                }
                _ => {
                    let field = Field::of_unit(unit).calendar_unwrap()?;
                    cursor.get(field)?
                }
            };
            comps.set_value(unit, Some(value));
        }
        Ok(comps)
    }

    /// Composes components into an absolute time.
    ///
    /// Resolution is lenient the way a resolving calendar engine is: values
    /// outside their legal range carry into the containing unit, a skipped
    /// local time shifts forward across the transition, and a repeated local
    /// time resolves to its first occurrence.
    pub fn compose(&self, comps: &DateComponents) -> CalendarResult<f64> {
        let backend = &self.backend;
        let set = comps.set_units();

        // The calendar year the date-level resolution works in.
        let era = comps.era;
        let ext_year = if let Some(year) = comps.year {
            backend.extended_year_for(era.unwrap_or(1), year)
        } else if era.is_some() || set.contains(CalendarUnit::Month) || set.contains(CalendarUnit::Day)
        {
            let cursor = backend.cursor(0)?;
            match era {
                Some(era) => backend.extended_year_for(era, 1),
                None => cursor.extended_year(),
            }
        } else {
            backend.cursor(0)?.extended_year()
        };

        let days = if let Some(week) = comps.week_of_year {
            let week_year = comps.year_for_week_of_year.unwrap_or(ext_year);
            backend.days_for_week_of_year(week_year, week, comps.weekday)?
        } else if let Some(year) = comps.year_for_week_of_year {
            backend.days_for_week_of_year(year, 1, comps.weekday)?
        } else {
            let month = match comps.month {
                Some(number) => backend
                    .month_ordinal_for(ext_year, number, comps.leap_month.unwrap_or(false))?
                    .unwrap_or(number),
                None => comps
                    .quarter
                    .map_or(1, |q| quarter_start_month(self.kind(), q)),
            };
            let base = backend.days_at(ext_year, month, comps.day.unwrap_or(1))?;
            self.apply_weekday_within_month(base, comps)?
        };

        let ns = comps.nanosecond.unwrap_or(0);
        let ms_of_day = comps.hour.unwrap_or(0) * MS_PER_HOUR
            + comps.minute.unwrap_or(0) * MS_PER_MINUTE
            + comps.second.unwrap_or(0) * MS_PER_SECOND
            + ns.div_euclid(1_000_000);
        let utc_ms = backend.local_to_utc_ms(days * MS_PER_DAY + ms_of_day);
        Ok(abs_from_ms(utc_ms) + (ns.rem_euclid(1_000_000)) as f64 / 1e9)
    }

    /// Weekday, weekday-ordinal and week-of-month placement within the month
    /// of `base`, when the pattern carries those but no explicit day.
    fn apply_weekday_within_month(
        &self,
        base: i64,
        comps: &DateComponents,
    ) -> CalendarResult<i64> {
        if comps.day.is_some() {
            return Ok(base);
        }
        let backend = &self.backend;
        let cursor = backend.cursor(backend.local_to_utc_ms(base * MS_PER_DAY))?;
        let month_start = base - (cursor.get(Field::DayOfMonth)? - 1);
        let days_in_month = cursor.days_in_month();

        if let Some(ordinal) = comps.weekday_ordinal {
            let start_dow = crate::utils::epoch_days_to_day_of_week(month_start);
            let target = comps.weekday.unwrap_or(i64::from(start_dow));
            let offset = (target - i64::from(start_dow)).rem_euclid(7);
            return Ok(month_start + offset + (ordinal - 1) * 7);
        }
        if let Some(wom) = comps.week_of_month {
            for day in 1..=days_in_month {
                let candidate = month_start + day - 1;
                let dow = i64::from(crate::utils::epoch_days_to_day_of_week(candidate));
                if comps.weekday.is_some_and(|wd| wd != dow) {
                    continue;
                }
                let mut probe = cursor.clone();
                probe.set_millis(backend.local_to_utc_ms(candidate * MS_PER_DAY))?;
                if probe.get(Field::WeekOfMonth)? == wom {
                    return Ok(candidate);
                }
            }
            return Ok(base);
        }
        if let Some(weekday) = comps.weekday {
            // First occurrence of the weekday on or after the base day.
            let dow = i64::from(crate::utils::epoch_days_to_day_of_week(base));
            return Ok(base + (weekday - dow).rem_euclid(7));
        }
        Ok(base)
    }

    /// Adds each set component to `at`, largest unit first.
    pub fn add_components(
        &self,
        comps: &DateComponents,
        at: f64,
        options: AddOptions,
    ) -> CalendarResult<f64> {
        let mut at = at;
        for unit in UNITS_DESCENDING {
            if let Some(amount) = comps.value_for(unit) {
                if amount != 0 {
                    at = self.add_unit(unit, amount, at, options)?;
                }
            }
        }
        Ok(at)
    }

    /// The difference from `from` to `to`, decomposed into the requested
    /// units largest-first, each value the number of whole units.
    pub fn component_difference(
        &self,
        from: f64,
        to: f64,
        units: UnitSet,
    ) -> CalendarResult<DateComponents> {
        let target = ms_from_abs(to);
        let mut cursor = self.backend.cursor(ms_from_abs(from))?;
        let mut comps = DateComponents::new();
        for unit in units.iter() {
            match unit {
                // The backend cannot compute a quarter difference.
                CalendarUnit::Quarter | CalendarUnit::Era => {}
                CalendarUnit::Nanosecond => {
                    let remaining = (target - cursor.millis()) * 1_000_000;
                    comps.nanosecond = Some(remaining);
                }
                _ => {
                    let field = Field::of_unit(unit).calendar_unwrap()?;
                    let amount = cursor.field_difference(target, field)?;
                    comps.set_value(unit, Some(amount));
                }
            }
        }
        Ok(comps)
    }

    /// Whether the calendar year containing `at` is a leap year (has more
    /// days than a common year).
    #[must_use]
    pub fn is_leap_year(&self, at: f64) -> bool {
        let Ok(cursor) = self.cursor_at(at) else {
            return false;
        };
        match self.kind() {
            CalendarKind::IslamicCivil
            | CalendarKind::IslamicObservational
            | CalendarKind::IslamicTabular
            | CalendarKind::IslamicUmmAlQura => cursor.days_in_year() >= 355,
            _ => cursor.months_in_year() == 13 || cursor.days_in_year() >= 366,
        }
    }

    /// Number of days in the calendar month containing `at`.
    #[must_use]
    pub fn days_in_month(&self, at: f64) -> Option<i64> {
        self.cursor_at(at).ok().map(|c| c.days_in_month())
    }

    /// Number of months in the calendar year containing `at`.
    #[must_use]
    pub fn months_in_year(&self, at: f64) -> Option<i64> {
        self.cursor_at(at).ok().map(|c| c.months_in_year())
    }
}

/// Best-effort nanosecond within the second of `at`.
pub(crate) fn nanosecond_of(at: f64) -> i64 {
    let sub = at - at.floor();
    (sub * 1e9) as i64
}
