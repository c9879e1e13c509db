//! The `datematch` crate is a calendrical computation and date enumeration
//! engine over ICU4X calendar data.
//!
//! ```rust
//! use datematch::{Calendar, CalendarKind, CalendarUnit, DateComponents, SearchOptions};
//!
//! let calendar = Calendar::new(CalendarKind::Gregorian);
//!
//! // 2024-03-19 15:30:45 UTC.
//! let at = 1_710_862_245.0;
//! assert_eq!(calendar.component(CalendarUnit::Year, at), Some(2024));
//! assert_eq!(calendar.component(CalendarUnit::Weekday, at), Some(3));
//!
//! // The next leap day after that instant.
//! let pattern = DateComponents::new().with_month(2).with_day(29);
//! let leap_day = calendar
//!     .next_date_matching(at, &pattern, SearchOptions::new())
//!     .unwrap();
//! assert_eq!(calendar.component(CalendarUnit::Year, leap_day), Some(2028));
//! ```
//!
//! Instants are absolute times: `f64` seconds since the Unix epoch. A
//! [`Calendar`] pairs a calendar system with a time zone and week
//! configuration; every query decomposes an instant on a function-local
//! cursor, so calendars are cheap to clone and safe to share.
#![no_std]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    unused_crate_dependencies,
    clippy::module_name_repetitions,
    clippy::redundant_pub_crate,
    clippy::too_many_lines,
    clippy::cognitive_complexity,
    clippy::missing_errors_doc,
    clippy::option_if_let_else,

    // Field values are i64 end to end; narrowing happens at the ICU seam.
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
)]

extern crate alloc;
extern crate core;

#[cfg(feature = "std")]
extern crate std;

pub mod components;
pub mod error;
pub mod options;
pub mod timezone;
pub mod unit;

mod arithmetic;
mod backend;
mod calendar;
mod enumerate;
mod fields;
mod matcher;
mod ordinality;
mod range;

#[doc(hidden)]
pub(crate) mod utils;

#[doc(inline)]
pub use error::CalendarError;

/// The crate's result type.
pub type CalendarResult<T> = Result<T, CalendarError>;

pub use crate::{
    calendar::{Calendar, CalendarKind},
    components::DateComponents,
    options::{AddOptions, Direction, MatchPolicy, RepeatedInstant, SearchOptions},
    timezone::TimeZone,
    unit::{CalendarUnit, UnitSet},
};

/// A library specific trait for unwrapping assertions.
pub(crate) trait CalendarUnwrap {
    type Output;

    /// Unwraps an internal invariant. Panics in debug builds, throws an
    /// assertion error at runtime.
    fn calendar_unwrap(self) -> CalendarResult<Self::Output>;
}

impl<T> CalendarUnwrap for Option<T> {
    type Output = T;

    fn calendar_unwrap(self) -> CalendarResult<Self::Output> {
        debug_assert!(self.is_some());
        self.ok_or(CalendarError::assert())
    }
}
