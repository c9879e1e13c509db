//! Calendar units and the unit containment hierarchy.

use core::fmt;

/// One grain of calendrical structure.
///
/// Units are ordered from coarsest to finest; the discriminant doubles as the
/// index into [`UnitSet`] and the hierarchy table, so `Era < Year < ... <
/// Nanosecond` holds for the derived `Ord`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CalendarUnit {
    Era = 0,
    Year = 1,
    YearForWeekOfYear = 2,
    Quarter = 3,
    WeekOfYear = 4,
    Month = 5,
    WeekOfMonth = 6,
    WeekdayOrdinal = 7,
    Weekday = 8,
    Day = 9,
    Hour = 10,
    Minute = 11,
    Second = 12,
    Nanosecond = 13,
}

/// Every unit, coarsest first. The search and matching passes walk this
/// order.
pub const UNITS_DESCENDING: [CalendarUnit; 14] = [
    CalendarUnit::Era,
    CalendarUnit::Year,
    CalendarUnit::YearForWeekOfYear,
    CalendarUnit::Quarter,
    CalendarUnit::WeekOfYear,
    CalendarUnit::Month,
    CalendarUnit::WeekOfMonth,
    CalendarUnit::WeekdayOrdinal,
    CalendarUnit::Weekday,
    CalendarUnit::Day,
    CalendarUnit::Hour,
    CalendarUnit::Minute,
    CalendarUnit::Second,
    CalendarUnit::Nanosecond,
];

/// Parent of each unit in the containment hierarchy, indexed by
/// discriminant. `None` for the root.
const NEXT_HIGHER: [Option<CalendarUnit>; 14] = [
    None,                                  // Era
    Some(CalendarUnit::Era),               // Year
    Some(CalendarUnit::Era),               // YearForWeekOfYear
    Some(CalendarUnit::Year),              // Quarter
    Some(CalendarUnit::YearForWeekOfYear), // WeekOfYear
    Some(CalendarUnit::Year),              // Month
    Some(CalendarUnit::Month),             // WeekOfMonth
    Some(CalendarUnit::Month),             // WeekdayOrdinal
    Some(CalendarUnit::WeekOfMonth),       // Weekday
    Some(CalendarUnit::Month),             // Day
    Some(CalendarUnit::Day),               // Hour
    Some(CalendarUnit::Hour),              // Minute
    Some(CalendarUnit::Minute),            // Second
    Some(CalendarUnit::Second),            // Nanosecond
];

impl CalendarUnit {
    /// The unit immediately containing this one, or `None` for [`Era`].
    ///
    /// [`Era`]: CalendarUnit::Era
    #[inline]
    #[must_use]
    pub fn next_higher(self) -> Option<CalendarUnit> {
        NEXT_HIGHER[self as usize]
    }

    #[inline]
    pub(crate) const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for CalendarUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Era => "era",
            Self::Year => "year",
            Self::YearForWeekOfYear => "yearForWeekOfYear",
            Self::Quarter => "quarter",
            Self::WeekOfYear => "weekOfYear",
            Self::Month => "month",
            Self::WeekOfMonth => "weekOfMonth",
            Self::WeekdayOrdinal => "weekdayOrdinal",
            Self::Weekday => "weekday",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Nanosecond => "nanosecond",
        };
        name.fmt(f)
    }
}

/// A set of calendar units, stored as a bit per unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnitSet(u16);

impl UnitSet {
    /// The empty set.
    pub const EMPTY: UnitSet = UnitSet(0);

    /// Every unit.
    pub const ALL: UnitSet = {
        let mut bits = 0u16;
        let mut i = 0;
        while i < 14 {
            bits |= 1 << i;
            i += 1;
        }
        UnitSet(bits)
    };

    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    #[inline]
    #[must_use]
    pub fn contains(self, unit: CalendarUnit) -> bool {
        self.0 & unit.bit() != 0
    }

    #[inline]
    #[must_use]
    pub fn with(self, unit: CalendarUnit) -> Self {
        Self(self.0 | unit.bit())
    }

    #[inline]
    #[must_use]
    pub fn without(self, unit: CalendarUnit) -> Self {
        Self(self.0 & !unit.bit())
    }

    #[inline]
    pub fn insert(&mut self, unit: CalendarUnit) {
        self.0 |= unit.bit();
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The coarsest unit in the set.
    #[must_use]
    pub fn highest(self) -> Option<CalendarUnit> {
        UNITS_DESCENDING.iter().copied().find(|u| self.contains(*u))
    }

    /// The finest unit in the set.
    #[must_use]
    pub fn lowest(self) -> Option<CalendarUnit> {
        UNITS_DESCENDING
            .iter()
            .rev()
            .copied()
            .find(|u| self.contains(*u))
    }

    /// Iterates the set coarsest-first.
    pub fn iter(self) -> impl Iterator<Item = CalendarUnit> {
        UNITS_DESCENDING
            .into_iter()
            .filter(move |u| self.contains(*u))
    }
}

impl FromIterator<CalendarUnit> for UnitSet {
    fn from_iter<I: IntoIterator<Item = CalendarUnit>>(iter: I) -> Self {
        let mut set = UnitSet::new();
        for unit in iter {
            set.insert(unit);
        }
        set
    }
}
