//! Wall-clock calendar definitions.
//!
//! Values here carry no timezone: they describe a lawyer-local wall clock and
//! are never converted between offsets.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::FormatItem, macros::format_description};

/// Format of a [`Date`] string.
const DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Number of minutes in a day.
const MINUTES_PER_DAY: u16 = 24 * 60;

/// Calendar date without a time component, in `YYYY-MM-DD` format.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "String", into = "String")
)]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the month (`1..=12`) of this [`Date`].
    #[must_use]
    pub fn month(self) -> u8 {
        u8::from(self.0.month())
    }

    /// Returns the day of the month of this [`Date`].
    #[must_use]
    pub fn day(self) -> u8 {
        self.0.day()
    }

    /// Returns the [`time::Weekday`] this [`Date`] falls on.
    #[must_use]
    pub fn weekday(self) -> time::Weekday {
        self.0.weekday()
    }

    /// Returns the [`Date`] shifted by the provided number of days.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.0
            .checked_add(time::Duration::days(days))
            .map(Self)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(DATE_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for Date {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| "invalid `Date`, expected `YYYY-MM-DD`")
    }
}

impl TryFrom<String> for Date {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Date> for String {
    fn from(date: Date) -> Self {
        date.to_string()
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

/// Whole-minute time of day in 24-hour `HH:MM` format.
///
/// The end of a day is representable as `24:00`, so a [`Time`] may be used as
/// an exclusive interval bound.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Time(u16);

impl Time {
    /// Midnight, the beginning of a day.
    pub const MIDNIGHT: Self = Self(0);

    /// End of a day (`24:00`).
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Creates a new [`Time`] from the provided hour and minute.
    ///
    /// [`None`] is returned if `hour` is not in `0..=23` or `minute` is not
    /// in `0..=59`.
    #[must_use]
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60)
            .then(|| Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    /// Returns the hour component of this [`Time`].
    #[must_use]
    pub fn hour(self) -> u8 {
        u8::try_from(self.0 / 60).unwrap_or(24)
    }

    /// Returns the minute component of this [`Time`].
    #[must_use]
    pub fn minute(self) -> u8 {
        u8::try_from(self.0 % 60).unwrap_or(0)
    }

    /// Returns the number of minutes since midnight.
    #[must_use]
    pub fn minutes_since_midnight(self) -> u16 {
        self.0
    }

    /// Adds the provided number of minutes to this [`Time`], carrying minute
    /// overflow into hours.
    ///
    /// [`None`] is returned if the result passes the [`END_OF_DAY`].
    ///
    /// [`END_OF_DAY`]: Self::END_OF_DAY
    #[must_use]
    pub fn checked_add_minutes(self, minutes: u16) -> Option<Self> {
        self.0
            .checked_add(minutes)
            .filter(|m| *m <= MINUTES_PER_DAY)
            .map(Self)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for Time {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ERR: &str = "invalid `Time`, expected `HH:MM`";

        let (hour, minute) = s.split_once(':').ok_or(ERR)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(ERR);
        }
        let hour = hour.parse::<u8>().map_err(|_| ERR)?;
        let minute = minute.parse::<u8>().map_err(|_| ERR)?;
        Self::from_hm(hour, minute).ok_or(ERR)
    }
}

impl From<time::Time> for Time {
    fn from(t: time::Time) -> Self {
        Self(u16::from(t.hour()) * 60 + u16::from(t.minute()))
    }
}

impl TryFrom<Time> for time::Time {
    type Error = time::error::ComponentRange;

    fn try_from(t: Time) -> Result<Self, Self::Error> {
        Self::from_hms(t.hour(), t.minute(), 0)
    }
}

/// Moment on a lawyer-local wall clock.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WallClock {
    /// [`Date`] part of this [`WallClock`].
    pub date: Date,

    /// [`Time`] part of this [`WallClock`].
    pub time: Time,
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Time {
    accepts!(TIME);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Time::from_sql(ty, raw).map(Self::from)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Time {
    accepts!(TIME);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        time::Time::try_from(*self)?.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in `YYYY-MM-DD` format, without a timezone.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }

    /// Wall-clock time of day in 24-hour `HH:MM` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Time = super::Time;

    impl Time {
        fn to_output<S: ScalarValue>(t: &Time) -> Value<S> {
            Value::scalar(t.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Time` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Time` input scalar: {e}")
                    })
                })
        }
    }
}
