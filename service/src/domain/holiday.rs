//! [`HolidayCalendar`] definitions.

use std::collections::BTreeSet;

use common::Date;
use time::Weekday;

/// Calendar of non-bookable public holidays.
#[derive(Clone, Debug, Default)]
pub struct HolidayCalendar {
    /// [`Rule`]s computing holidays of any year.
    rules: Vec<Rule>,

    /// Explicitly listed holidays.
    dates: BTreeSet<Date>,
}

impl HolidayCalendar {
    /// Creates a new [`HolidayCalendar`] with Chilean public holidays.
    #[must_use]
    pub fn chile() -> Self {
        use Rule as R;

        Self {
            rules: vec![
                R::Fixed { month: 1, day: 1 },
                R::Easter { offset: -2 },
                R::Easter { offset: -1 },
                R::Fixed { month: 5, day: 1 },
                R::Fixed { month: 5, day: 21 },
                R::NearestMonday { month: 6, day: 29 },
                R::Fixed { month: 7, day: 16 },
                R::Fixed { month: 8, day: 15 },
                R::Fixed { month: 9, day: 18 },
                R::Fixed { month: 9, day: 19 },
                R::NearestMonday { month: 10, day: 12 },
                R::NearestFriday { month: 10, day: 31 },
                R::Fixed { month: 11, day: 1 },
                R::Fixed { month: 12, day: 8 },
                R::Fixed { month: 12, day: 25 },
            ],
            dates: BTreeSet::new(),
        }
    }

    /// Adds the provided explicit holidays to this [`HolidayCalendar`].
    #[must_use]
    pub fn with_dates(mut self, dates: impl IntoIterator<Item = Date>) -> Self {
        self.dates.extend(dates);
        self
    }

    /// Indicates whether the provided [`Date`] is a public holiday.
    #[must_use]
    pub fn is_holiday(&self, date: Date) -> bool {
        self.dates.contains(&date)
            || self
                .rules
                .iter()
                .any(|rule| rule.date_in(date.year()) == Some(date))
    }

    /// Returns all the holidays of the provided year, in ascending order.
    #[must_use]
    pub fn holidays_in(&self, year: i32) -> BTreeSet<Date> {
        self.rules
            .iter()
            .filter_map(|rule| rule.date_in(year))
            .chain(self.dates.iter().copied().filter(|d| d.year() == year))
            .collect()
    }
}

/// Rule computing a holiday [`Date`] of a year.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Rule {
    /// Same month and day every year.
    Fixed {
        /// Month of the holiday.
        month: u8,

        /// Day of the month of the holiday.
        day: u8,
    },

    /// Offset in days from Easter Sunday.
    Easter {
        /// Number of days relative to Easter Sunday.
        offset: i64,
    },

    /// Moved to a Monday when falling from Tuesday to Friday: to the Monday
    /// of the same week from Tuesday to Thursday, to the next Monday on
    /// Friday.
    NearestMonday {
        /// Month of the nominal holiday.
        month: u8,

        /// Day of the month of the nominal holiday.
        day: u8,
    },

    /// Moved to the previous Friday when falling on Tuesday, to the next
    /// Friday when falling on Wednesday.
    NearestFriday {
        /// Month of the nominal holiday.
        month: u8,

        /// Day of the month of the nominal holiday.
        day: u8,
    },
}

impl Rule {
    /// Computes the [`Date`] of this [`Rule`] in the provided year.
    fn date_in(self, year: i32) -> Option<Date> {
        match self {
            Self::Fixed { month, day } => Date::from_ymd(year, month, day),
            Self::Easter { offset } => easter(year)?.checked_add_days(offset),
            Self::NearestMonday { month, day } => {
                let nominal = Date::from_ymd(year, month, day)?;
                let shift = match nominal.weekday() {
                    Weekday::Tuesday => -1,
                    Weekday::Wednesday => -2,
                    Weekday::Thursday => -3,
                    Weekday::Friday => 3,
                    Weekday::Saturday | Weekday::Sunday | Weekday::Monday => 0,
                };
                nominal.checked_add_days(shift)
            }
            Self::NearestFriday { month, day } => {
                let nominal = Date::from_ymd(year, month, day)?;
                let shift = match nominal.weekday() {
                    Weekday::Tuesday => -4,
                    Weekday::Wednesday => 2,
                    Weekday::Monday
                    | Weekday::Thursday
                    | Weekday::Friday
                    | Weekday::Saturday
                    | Weekday::Sunday => 0,
                };
                nominal.checked_add_days(shift)
            }
        }
    }
}

/// Computes the Easter Sunday of the provided year in the Gregorian calendar
/// (anonymous Gregorian algorithm).
#[must_use]
pub fn easter(year: i32) -> Option<Date> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    Date::from_ymd(year, u8::try_from(month).ok()?, u8::try_from(day).ok()?)
}
