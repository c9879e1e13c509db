//! Unit arithmetic on absolute times.
//!
//! Sub-day units are pure instant arithmetic. Day-and-larger units are civil
//! arithmetic on the local wall clock, so adding a day across a daylight
//! saving transition lands on the same wall time even though fewer or more
//! real seconds elapsed.

use crate::{
    calendar::{abs_from_ms, ms_from_abs, Calendar},
    error::CalendarError,
    fields::Field,
    options::AddOptions,
    unit::CalendarUnit,
    CalendarResult, CalendarUnwrap,
};

impl Calendar {
    /// Adds `amount` of `unit` to `at`. With `options.wrap` the value rolls
    /// within its containing unit instead of carrying into it.
    pub fn add_unit(
        &self,
        unit: CalendarUnit,
        amount: i64,
        at: f64,
        options: AddOptions,
    ) -> CalendarResult<f64> {
        if amount == 0 {
            return Ok(at);
        }
        let ms = ms_from_abs(at);
        let sub_ms = at - abs_from_ms(ms);
        let mut cursor = self.backend().cursor(ms)?;

        let (field, amount) = match unit {
            CalendarUnit::Era => {
                return Err(
                    CalendarError::r#type().with_message("cannot add to the era unit")
                );
            }
            // A quarter advances by whole months.
            CalendarUnit::Quarter => (Field::Month, amount * 3),
            CalendarUnit::Nanosecond => {
                let carry_ms = amount.div_euclid(1_000_000);
                let rest_ns = amount.rem_euclid(1_000_000);
                cursor.add(Field::Millisecond, carry_ms)?;
                return Ok(abs_from_ms(cursor.millis()) + sub_ms + rest_ns as f64 / 1e9);
            }
            _ => (Field::of_unit(unit).calendar_unwrap()?, amount),
        };

        if options.wrap {
            cursor.roll(field, amount)?;
        } else {
            cursor.add(field, amount)?;
        }
        Ok(abs_from_ms(cursor.millis()) + sub_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::tests::utc_secs;
    use crate::timezone::TimeZone;
    use icu_calendar::AnyCalendarKind;

    #[test]
    fn add_hours_is_instant_arithmetic_across_fall_back() {
        let mut cal = Calendar::new(AnyCalendarKind::Gregorian);
        cal.set_time_zone(TimeZone::named("America/Los_Angeles").unwrap());
        // 00:30 PDT on fall-back day is 07:30 UTC.
        let at = utc_secs(2023, 11, 5, 7, 30, 0);
        let later = cal
            .add_unit(CalendarUnit::Hour, 2, at, AddOptions::new())
            .unwrap();
        assert_eq!(later - at, 7_200.0);
        // Two real hours later the wall clock reads 01:30 again, now PST.
        assert_eq!(cal.component(CalendarUnit::Hour, later), Some(1));
        assert_eq!(cal.component(CalendarUnit::Minute, later), Some(30));
    }

    #[test]
    fn add_day_preserves_wall_time_across_spring_forward() {
        let mut cal = Calendar::new(AnyCalendarKind::Gregorian);
        cal.set_time_zone(TimeZone::named("America/Los_Angeles").unwrap());
        // 2023-03-11 08:00 PST.
        let at = utc_secs(2023, 3, 11, 16, 0, 0);
        let next = cal
            .add_unit(CalendarUnit::Day, 1, at, AddOptions::new())
            .unwrap();
        assert_eq!(cal.component(CalendarUnit::Hour, next), Some(8));
        assert_eq!(cal.component(CalendarUnit::Day, next), Some(12));
        assert_eq!(next - at, 23.0 * 3_600.0);
    }

    #[test]
    fn add_month_pins_day_of_month() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2023, 1, 31, 9, 0, 0);
        let next = cal
            .add_unit(CalendarUnit::Month, 1, at, AddOptions::new())
            .unwrap();
        assert_eq!(next, utc_secs(2023, 2, 28, 9, 0, 0));
    }

    #[test]
    fn wrapping_add_rolls_within_the_year() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2023, 12, 15, 0, 0, 0);
        let rolled = cal
            .add_unit(CalendarUnit::Month, 1, at, AddOptions::wrapping())
            .unwrap();
        assert_eq!(rolled, utc_secs(2023, 1, 15, 0, 0, 0));
    }

    #[test]
    fn add_quarter_is_three_months() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2024, 1, 15, 0, 0, 0);
        let next = cal
            .add_unit(CalendarUnit::Quarter, 1, at, AddOptions::new())
            .unwrap();
        assert_eq!(next, utc_secs(2024, 4, 15, 0, 0, 0));
    }

    #[test]
    fn add_nanoseconds_best_effort() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2024, 1, 1, 0, 0, 0);
        let next = cal
            .add_unit(CalendarUnit::Nanosecond, 1_500_000_000, at, AddOptions::new())
            .unwrap();
        assert!((next - at - 1.5).abs() < 1e-9);
    }

    #[test]
    fn adding_to_era_is_an_error() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        assert!(cal
            .add_unit(CalendarUnit::Era, 1, 0.0, AddOptions::new())
            .is_err());
    }
}
