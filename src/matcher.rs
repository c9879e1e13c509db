//! Pattern matching: does an instant carry the component values of a
//! pattern.

use crate::{
    calendar::Calendar,
    components::DateComponents,
    fields::Field,
    unit::{CalendarUnit, UnitSet},
    CalendarResult,
};

/// The verdict of matching one instant against a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MatchReport {
    /// Every compared unit matched.
    pub(crate) exact: bool,
    /// The units whose values disagreed, coarsest first when iterated.
    pub(crate) mismatched: UnitSet,
}

impl Calendar {
    /// Compares the instant's components against the set fields of `comps`.
    ///
    /// Quarter is derived and nanosecond is sub-resolution; neither
    /// participates in exactness. A set leap month flag must agree when the
    /// pattern names a month.
    pub(crate) fn match_report(
        &self,
        at: f64,
        comps: &DateComponents,
    ) -> CalendarResult<MatchReport> {
        let cursor = self.cursor_at(at)?;
        let mut mismatched = UnitSet::new();
        for unit in comps.set_units().iter() {
            let Some(expected) = comps.value_for(unit) else {
                continue;
            };
            let actual = match unit {
                CalendarUnit::Quarter | CalendarUnit::Nanosecond => continue,
                CalendarUnit::Month => cursor.month_number(),
                _ => match Field::of_unit(unit) {
                    Some(field) => cursor.get(field)?,
                    None => continue,
                },
            };
            if actual != expected {
                mismatched.insert(unit);
            }
        }
        if comps.month.is_some() {
            if let Some(leap) = comps.leap_month {
                if cursor.is_leap_month() != leap {
                    mismatched.insert(CalendarUnit::Month);
                }
            }
        }
        Ok(MatchReport {
            exact: mismatched.is_empty(),
            mismatched,
        })
    }

    /// Whether `at` matches every set field of `comps` exactly.
    pub fn date_matches_components(&self, at: f64, comps: &DateComponents) -> bool {
        self.match_report(at, comps).is_ok_and(|r| r.exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::tests::utc_secs;
    use icu_calendar::AnyCalendarKind;

    #[test]
    fn exact_match() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2024, 3, 19, 15, 30, 0);
        let comps = DateComponents::new()
            .with_month(3)
            .with_day(19)
            .with_hour(15);
        assert!(cal.date_matches_components(at, &comps));
    }

    #[test]
    fn mismatch_reports_units() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2024, 3, 19, 15, 30, 0);
        let comps = DateComponents::new()
            .with_month(4)
            .with_day(19)
            .with_minute(31);
        let report = cal.match_report(at, &comps).unwrap();
        assert!(!report.exact);
        assert!(report.mismatched.contains(CalendarUnit::Month));
        assert!(report.mismatched.contains(CalendarUnit::Minute));
        assert!(!report.mismatched.contains(CalendarUnit::Day));
    }

    #[test]
    fn quarter_does_not_affect_exactness() {
        let cal = Calendar::new(AnyCalendarKind::Gregorian);
        let at = utc_secs(2024, 1, 15, 0, 0, 0);
        // Quarter 4 is wrong for January but quarter is derived.
        let comps = DateComponents::new().with_day(15).with_quarter(4);
        assert!(cal.date_matches_components(at, &comps));
    }

    #[test]
    fn leap_month_flag_must_agree() {
        let cal = Calendar::new(AnyCalendarKind::Chinese);
        // The guimao year's leap month ended in April 2023; mid-June falls
        // in a regular month.
        let at = utc_secs(2023, 6, 15, 0, 0, 0);
        let cursor = cal.cursor_at(at).unwrap();
        let month = cursor.month_number();
        let comps = DateComponents::new().with_month(month).with_leap_month(true);
        assert!(!cal.date_matches_components(at, &comps));
        let comps = DateComponents::new().with_month(month).with_leap_month(false);
        assert!(cal.date_matches_components(at, &comps));
    }
}
