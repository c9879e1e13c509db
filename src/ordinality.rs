//! Ordinal positions and value ranges of one unit within a larger unit.

use icu_calendar::AnyCalendarKind;

use crate::{
    backend::Cursor,
    calendar::{nanosecond_of, Calendar},
    fields::{Field, LimitKind},
    unit::CalendarUnit,
    utils::MS_PER_DAY,
};

// Quarters are a fiscal overlay. Hebrew years traditionally open their
// fiscal year in Tishri (month 8 of the civil numbering), so its quarters
// rotate; every other calendar groups months of three, with a 13th month
// absorbed into the fourth quarter.
const QUARTER_OF_MONTH: [i64; 13] = [1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 4];
const QUARTER_OF_MONTH_HEBREW: [i64; 13] = [3, 3, 3, 4, 4, 4, 4, 1, 1, 1, 2, 2, 2];

/// Quarter (1 through 4) containing the 1-based `month`.
pub(crate) fn quarter_of_month(kind: AnyCalendarKind, month: i64) -> i64 {
    let idx = (month - 1).clamp(0, 12) as usize;
    match kind {
        AnyCalendarKind::Hebrew => QUARTER_OF_MONTH_HEBREW[idx],
        _ => QUARTER_OF_MONTH[idx],
    }
}

/// First month (1-based) of quarter `q`.
pub(crate) fn quarter_start_month(kind: AnyCalendarKind, q: i64) -> i64 {
    let idx = (q.clamp(1, 4) - 1) as usize;
    match kind {
        AnyCalendarKind::Hebrew => [8, 11, 1, 4][idx],
        _ => [1, 4, 7, 10][idx],
    }
}

impl Calendar {
    /// The 1-based ordinal position of `smaller` within the instance of
    /// `bigger` containing `at`. `None` for pairs with no defined ordering.
    #[must_use]
    pub fn ordinality_of_unit(
        &self,
        smaller: CalendarUnit,
        bigger: CalendarUnit,
        at: f64,
    ) -> Option<i64> {
        if smaller <= bigger {
            return None;
        }
        let cursor = self.cursor_at(at).ok()?;
        match bigger {
            CalendarUnit::Era => self.ordinality_in_era(smaller, &cursor, at),
            CalendarUnit::Year => self.ordinality_in_year(smaller, &cursor),
            CalendarUnit::YearForWeekOfYear => {
                let year = cursor.get(Field::YearForWeekOfYear).ok()?;
                let start = self
                    .backend()
                    .days_for_week_of_year(year, 1, None)
                    .ok()?;
                let day_in = cursor.local_days() - start + 1;
                match smaller {
                    CalendarUnit::WeekOfYear => cursor.get(Field::WeekOfYear).ok(),
                    CalendarUnit::Day | CalendarUnit::Weekday => Some(day_in),
                    _ => None,
                }
            }
            CalendarUnit::Quarter => self.ordinality_in_quarter(smaller, &cursor),
            CalendarUnit::Month => self.ordinality_in_month(smaller, &cursor),
            CalendarUnit::WeekOfYear | CalendarUnit::WeekOfMonth => {
                let dow = cursor.get(Field::DayOfWeek).ok()?;
                let rel = (dow - i64::from(self.first_weekday())).rem_euclid(7);
                match smaller {
                    CalendarUnit::Day | CalendarUnit::Weekday => Some(rel + 1),
                    CalendarUnit::Hour => {
                        Some(rel * 24 + cursor.get(Field::HourOfDay).ok()? + 1)
                    }
                    CalendarUnit::Minute => Some(
                        (rel * 24 + cursor.get(Field::HourOfDay).ok()?) * 60
                            + cursor.get(Field::Minute).ok()?
                            + 1,
                    ),
                    _ => None,
                }
            }
            CalendarUnit::Day | CalendarUnit::Weekday | CalendarUnit::WeekdayOrdinal => {
                let hour = cursor.get(Field::HourOfDay).ok()?;
                match smaller {
                    CalendarUnit::Hour => Some(hour + 1),
                    CalendarUnit::Minute => Some(hour * 60 + cursor.get(Field::Minute).ok()? + 1),
                    CalendarUnit::Second => Some(
                        hour * 3_600
                            + cursor.get(Field::Minute).ok()? * 60
                            + cursor.get(Field::Second).ok()?
                            + 1,
                    ),
                    _ => None,
                }
            }
            CalendarUnit::Hour => match smaller {
                CalendarUnit::Minute => Some(cursor.get(Field::Minute).ok()? + 1),
                CalendarUnit::Second => Some(
                    cursor.get(Field::Minute).ok()? * 60 + cursor.get(Field::Second).ok()? + 1,
                ),
                _ => None,
            },
            CalendarUnit::Minute => match smaller {
                CalendarUnit::Second => Some(cursor.get(Field::Second).ok()? + 1),
                _ => None,
            },
            CalendarUnit::Second => match smaller {
                CalendarUnit::Nanosecond => Some(nanosecond_of(at) + 1),
                _ => None,
            },
            _ => None,
        }
    }

    fn ordinality_in_era(
        &self,
        smaller: CalendarUnit,
        cursor: &Cursor<'_>,
        at: f64,
    ) -> Option<i64> {
        let year = cursor.get(Field::Year).ok()?;
        match smaller {
            CalendarUnit::Year => Some(year),
            CalendarUnit::Quarter => {
                let month = cursor.get(Field::Month).ok()?;
                Some((year - 1) * 4 + quarter_of_month(self.kind(), month))
            }
            CalendarUnit::Month => {
                let month = cursor.get(Field::Month).ok()?;
                match months_before_era_year(self.kind(), year) {
                    Some(before) => Some(before + month),
                    // No closed form; count from the era start.
                    None => {
                        let start = self.era_start_days_at(at)?;
                        let mut probe = self
                            .backend()
                            .cursor(self.backend().local_to_utc_ms(start * MS_PER_DAY))
                            .ok()?;
                        let months = probe.field_difference(cursor.millis(), Field::Month).ok()?;
                        Some(months + 1)
                    }
                }
            }
            CalendarUnit::WeekOfYear | CalendarUnit::WeekOfMonth => {
                let start = self.era_start_days_at(at)?;
                let start_dow = i64::from(crate::utils::epoch_days_to_day_of_week(start));
                let rel = (start_dow - i64::from(self.first_weekday())).rem_euclid(7);
                Some((cursor.local_days() - start + rel) / 7 + 1)
            }
            CalendarUnit::Weekday | CalendarUnit::WeekdayOrdinal => {
                let start = self.era_start_days_at(at)?;
                Some((cursor.local_days() - start) / 7 + 1)
            }
            CalendarUnit::Day => {
                let start = self.era_start_days_at(at)?;
                Some(cursor.local_days() - start + 1)
            }
            CalendarUnit::Hour => {
                let days = cursor.local_days() - self.era_start_days_at(at)?;
                Some(days * 24 + cursor.get(Field::HourOfDay).ok()? + 1)
            }
            _ => None,
        }
    }

    fn ordinality_in_year(&self, smaller: CalendarUnit, cursor: &Cursor<'_>) -> Option<i64> {
        let doy = cursor.get(Field::DayOfYear).ok()?;
        match smaller {
            CalendarUnit::Quarter => {
                let month = cursor.get(Field::Month).ok()?;
                Some(quarter_of_month(self.kind(), month))
            }
            CalendarUnit::Month => cursor.get(Field::Month).ok(),
            CalendarUnit::WeekOfYear | CalendarUnit::WeekOfMonth => {
                // Weeks counted from the week containing the year's first
                // day, without the minimum-days adjustment, so the first
                // partial week is week 1.
                let dow = cursor.get(Field::DayOfWeek).ok()?;
                let psd = (dow - i64::from(self.first_weekday()) - doy + 1).rem_euclid(7);
                Some((doy - 1 + psd) / 7 + 1)
            }
            CalendarUnit::Day => Some(doy),
            CalendarUnit::Weekday | CalendarUnit::WeekdayOrdinal => Some((doy - 1) / 7 + 1),
            CalendarUnit::Hour => Some((doy - 1) * 24 + cursor.get(Field::HourOfDay).ok()? + 1),
            CalendarUnit::Minute => Some(
                ((doy - 1) * 24 + cursor.get(Field::HourOfDay).ok()?) * 60
                    + cursor.get(Field::Minute).ok()?
                    + 1,
            ),
            _ => None,
        }
    }

    fn ordinality_in_quarter(&self, smaller: CalendarUnit, cursor: &Cursor<'_>) -> Option<i64> {
        let start = self
            .unit_start_days(CalendarUnit::Quarter, cursor)
            .ok()
            .flatten()?;
        let day_in = cursor.local_days() - start + 1;
        match smaller {
            CalendarUnit::Month => {
                let mut probe = self
                    .backend()
                    .cursor(self.backend().local_to_utc_ms(start * MS_PER_DAY))
                    .ok()?;
                let months = probe.field_difference(cursor.millis(), Field::Month).ok()?;
                Some(months + 1)
            }
            CalendarUnit::Day | CalendarUnit::Weekday => Some(day_in),
            CalendarUnit::WeekOfYear | CalendarUnit::WeekOfMonth => {
                let start_dow = i64::from(crate::utils::epoch_days_to_day_of_week(start));
                let rel = (start_dow - i64::from(self.first_weekday())).rem_euclid(7);
                Some((day_in - 1 + rel) / 7 + 1)
            }
            _ => None,
        }
    }

    fn ordinality_in_month(&self, smaller: CalendarUnit, cursor: &Cursor<'_>) -> Option<i64> {
        let day = cursor.get(Field::DayOfMonth).ok()?;
        match smaller {
            CalendarUnit::WeekOfMonth | CalendarUnit::WeekOfYear => {
                let dow = cursor.get(Field::DayOfWeek).ok()?;
                let psd = (dow - i64::from(self.first_weekday()) - day + 1).rem_euclid(7);
                Some((day - 1 + psd) / 7 + 1)
            }
            CalendarUnit::Day => Some(day),
            CalendarUnit::Weekday | CalendarUnit::WeekdayOrdinal => {
                cursor.get(Field::DayOfWeekInMonth).ok()
            }
            CalendarUnit::Hour => Some((day - 1) * 24 + cursor.get(Field::HourOfDay).ok()? + 1),
            _ => None,
        }
    }

    /// The range of values `smaller` can take within the instance of
    /// `bigger` containing `at`, as `(location, length)`. `None` for pairs
    /// with no defined range.
    #[must_use]
    pub fn range_of_unit(
        &self,
        smaller: CalendarUnit,
        bigger: CalendarUnit,
        at: f64,
    ) -> Option<(i64, i64)> {
        if smaller <= bigger {
            return None;
        }
        let cursor = self.cursor_at(at).ok()?;
        match (smaller, bigger) {
            (CalendarUnit::Quarter, CalendarUnit::Year) => Some((1, 4)),
            (CalendarUnit::Month, CalendarUnit::Year) => Some((1, cursor.months_in_year())),
            (CalendarUnit::Month, CalendarUnit::Quarter) => {
                let start = self
                    .unit_start_days(CalendarUnit::Quarter, &cursor)
                    .ok()
                    .flatten()?;
                let end = self
                    .unit_end_days(CalendarUnit::Quarter, &cursor, start)
                    .ok()?;
                let mut probe = self
                    .backend()
                    .cursor(self.backend().local_to_utc_ms(start * MS_PER_DAY))
                    .ok()?;
                let target = self.backend().local_to_utc_ms((end - 1) * MS_PER_DAY);
                let months = probe.field_difference(target, Field::Month).ok()?;
                Some((1, months + 1))
            }
            (CalendarUnit::Day, CalendarUnit::Year) => Some((1, cursor.days_in_year())),
            (CalendarUnit::Day, CalendarUnit::Quarter) => {
                let start = self
                    .unit_start_days(CalendarUnit::Quarter, &cursor)
                    .ok()
                    .flatten()?;
                let end = self
                    .unit_end_days(CalendarUnit::Quarter, &cursor, start)
                    .ok()?;
                Some((1, end - start))
            }
            (CalendarUnit::Day, CalendarUnit::Month) => Some((1, cursor.days_in_month())),
            (
                CalendarUnit::Day | CalendarUnit::Weekday,
                CalendarUnit::WeekOfYear | CalendarUnit::WeekOfMonth,
            ) => Some((1, 7)),
            (CalendarUnit::WeekOfYear, CalendarUnit::Year) => {
                let dow = cursor.get(Field::DayOfWeek).ok()?;
                let doy = cursor.get(Field::DayOfYear).ok()?;
                let psd = (dow - i64::from(self.first_weekday()) - doy + 1).rem_euclid(7);
                Some((1, (cursor.days_in_year() - 1 + psd) / 7 + 1))
            }
            (CalendarUnit::WeekOfMonth, CalendarUnit::Month) => {
                let min = cursor
                    .get_limit(Field::WeekOfMonth, LimitKind::ActualMinimum)
                    .ok()?;
                let max = cursor
                    .get_limit(Field::WeekOfMonth, LimitKind::ActualMaximum)
                    .ok()?;
                Some((min, max - min + 1))
            }
            (
                CalendarUnit::WeekdayOrdinal | CalendarUnit::Weekday,
                CalendarUnit::Month,
            ) => {
                let max = cursor
                    .get_limit(Field::DayOfWeekInMonth, LimitKind::ActualMaximum)
                    .ok()?;
                Some((1, max))
            }
            (CalendarUnit::Hour, CalendarUnit::Day | CalendarUnit::Weekday) => Some((0, 24)),
            (CalendarUnit::Minute, CalendarUnit::Hour) => Some((0, 60)),
            (CalendarUnit::Second, CalendarUnit::Minute) => Some((0, 60)),
            (CalendarUnit::Nanosecond, CalendarUnit::Second) => Some((0, 1_000_000_000)),
            _ => None,
        }
    }
}

fn months_before_era_year(kind: AnyCalendarKind, era_year: i64) -> Option<i64> {
    let n = era_year - 1;
    match kind {
        // 235 months per 19-year Metonic cycle.
        AnyCalendarKind::Hebrew => Some(235 * (n / 19) + 12 * (n % 19) + (7 * (n % 19) + 1) / 19),
        AnyCalendarKind::Coptic
        | AnyCalendarKind::Ethiopian
        | AnyCalendarKind::EthiopianAmeteAlem => Some(n * 13),
        AnyCalendarKind::Chinese
        | AnyCalendarKind::Dangi
        | AnyCalendarKind::Japanese
        | AnyCalendarKind::JapaneseExtended => None,
        _ => Some(n * 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::tests::utc_secs;

    #[test]
    fn quarter_tables_cover_all_months() {
        for month in 1..=13 {
            let q = quarter_of_month(AnyCalendarKind::Gregorian, month);
            assert!((1..=4).contains(&q));
            let hq = quarter_of_month(AnyCalendarKind::Hebrew, month);
            assert!((1..=4).contains(&hq));
        }
        // Tishri opens the Hebrew fiscal year.
        assert_eq!(quarter_of_month(AnyCalendarKind::Hebrew, 8), 1);
        assert_eq!(quarter_start_month(AnyCalendarKind::Hebrew, 1), 8);
    }

    #[test]
    fn day_ordinalities() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2024, 3, 19, 15, 0, 0);
        assert_eq!(
            cal.ordinality_of_unit(CalendarUnit::Day, CalendarUnit::Month, at),
            Some(19)
        );
        // March 19 is day 79 of leap year 2024.
        assert_eq!(
            cal.ordinality_of_unit(CalendarUnit::Day, CalendarUnit::Year, at),
            Some(79)
        );
        assert_eq!(
            cal.ordinality_of_unit(CalendarUnit::Hour, CalendarUnit::Day, at),
            Some(16)
        );
    }

    #[test]
    fn weekday_ordinal_in_month() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        // Third Tuesday.
        let at = utc_secs(2024, 3, 19, 0, 0, 0);
        assert_eq!(
            cal.ordinality_of_unit(CalendarUnit::WeekdayOrdinal, CalendarUnit::Month, at),
            Some(3)
        );
        assert_eq!(
            cal.ordinality_of_unit(CalendarUnit::Weekday, CalendarUnit::WeekOfYear, at),
            Some(3)
        );
    }

    #[test]
    fn day_in_era_counts_from_era_start() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        // 1970-01-01 is 719163 days after 0001-01-01.
        assert_eq!(
            cal.ordinality_of_unit(CalendarUnit::Day, CalendarUnit::Era, 0.0),
            Some(719_163)
        );
    }

    #[test]
    fn month_in_era_closed_form() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2024, 3, 1, 0, 0, 0);
        assert_eq!(
            cal.ordinality_of_unit(CalendarUnit::Month, CalendarUnit::Era, at),
            Some(2023 * 12 + 3)
        );
    }

    #[test]
    fn ordering_guard() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        assert_eq!(
            cal.ordinality_of_unit(CalendarUnit::Year, CalendarUnit::Month, 0.0),
            None
        );
        assert_eq!(cal.range_of_unit(CalendarUnit::Year, CalendarUnit::Year, 0.0), None);
    }

    #[test]
    fn ranges() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2024, 2, 10, 0, 0, 0);
        assert_eq!(
            cal.range_of_unit(CalendarUnit::Day, CalendarUnit::Month, at),
            Some((1, 29))
        );
        assert_eq!(
            cal.range_of_unit(CalendarUnit::Month, CalendarUnit::Year, at),
            Some((1, 12))
        );
        assert_eq!(
            cal.range_of_unit(CalendarUnit::Hour, CalendarUnit::Day, at),
            Some((0, 24))
        );
        let hebrew = Calendar::new(AnyCalendarKind::Hebrew);
        // 5784 is a 13-month year.
        assert_eq!(
            hebrew.range_of_unit(CalendarUnit::Month, CalendarUnit::Year, at),
            Some((1, 13))
        );
        // 2024-03-01 is a Friday and March 2024 has five of them.
        assert_eq!(
            cal.range_of_unit(
                CalendarUnit::WeekdayOrdinal,
                CalendarUnit::Month,
                utc_secs(2024, 3, 1, 0, 0, 0)
            ),
            Some((1, 5))
        );
    }

    #[test]
    fn week_ordinal_counts_partial_first_week() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        // 2023-01-01 was a Sunday, so Jan 7 is still week 1.
        assert_eq!(
            cal.ordinality_of_unit(
                CalendarUnit::WeekOfYear,
                CalendarUnit::Year,
                utc_secs(2023, 1, 7, 0, 0, 0)
            ),
            Some(1)
        );
        assert_eq!(
            cal.ordinality_of_unit(
                CalendarUnit::WeekOfYear,
                CalendarUnit::Year,
                utc_secs(2023, 1, 8, 0, 0, 0)
            ),
            Some(2)
        );
    }
}
