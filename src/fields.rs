//! Backend field identifiers and unit translation.
//!
//! The engine addresses the backend through typed [`Field`]s. Batch traffic
//! (decompose and compose) moves whole [`DateComponents`] records in one
//! round trip rather than per-field strings.
//!
//! [`DateComponents`]: crate::components::DateComponents

use crate::unit::CalendarUnit;

/// A backend calendar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Field {
    Era,
    /// Year within the current era.
    Year,
    /// Monotonic year, era-independent.
    ExtendedYear,
    /// Ordinal month within the year, 1-based, leap months counted.
    Month,
    IsLeapMonth,
    WeekOfYear,
    WeekOfMonth,
    /// The year a week-of-year value belongs to.
    YearForWeekOfYear,
    DayOfMonth,
    DayOfYear,
    /// 1 = Sunday through 7 = Saturday.
    DayOfWeek,
    /// Which occurrence of the day's weekday this is within the month.
    DayOfWeekInMonth,
    HourOfDay,
    AmPm,
    Minute,
    Second,
    Millisecond,
}

impl Field {
    /// The field backing a calendar unit, or `None` for units the backend
    /// does not model directly (quarter is derived from the month).
    pub(crate) fn of_unit(unit: CalendarUnit) -> Option<Field> {
        match unit {
            CalendarUnit::Era => Some(Field::Era),
            CalendarUnit::Year => Some(Field::Year),
            CalendarUnit::YearForWeekOfYear => Some(Field::YearForWeekOfYear),
            CalendarUnit::Quarter => None,
            CalendarUnit::WeekOfYear => Some(Field::WeekOfYear),
            CalendarUnit::Month => Some(Field::Month),
            CalendarUnit::WeekOfMonth => Some(Field::WeekOfMonth),
            CalendarUnit::WeekdayOrdinal => Some(Field::DayOfWeekInMonth),
            CalendarUnit::Weekday => Some(Field::DayOfWeek),
            CalendarUnit::Day => Some(Field::DayOfMonth),
            CalendarUnit::Hour => Some(Field::HourOfDay),
            CalendarUnit::Minute => Some(Field::Minute),
            CalendarUnit::Second => Some(Field::Second),
            CalendarUnit::Nanosecond => Some(Field::Millisecond),
        }
    }
}

/// The kinds of field limit the backend can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LimitKind {
    Minimum,
    Maximum,
    GreatestMinimum,
    LeastMaximum,
    ActualMinimum,
    ActualMaximum,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UNITS_DESCENDING;

    #[test]
    fn only_quarter_lacks_a_field() {
        for unit in UNITS_DESCENDING {
            assert_eq!(
                Field::of_unit(unit).is_none(),
                unit == CalendarUnit::Quarter
            );
        }
    }
}
