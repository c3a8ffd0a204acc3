//! [`Zone`] of the lawyers' wall clock.

use common::{DateTime, WallClock};
use derive_more::{Display, Error};
use jiff::tz::{Offset, TimeZone};
use time::UtcOffset;

/// IANA name of the [`Zone`] the lawyers work in by default.
pub const SANTIAGO: &str = "America/Santiago";

/// Time zone the dates and times of appointments are expressed in.
///
/// The offset from UTC is resolved per instant, so daylight saving changes
/// are followed.
#[derive(Clone, Debug)]
pub struct Zone(TimeZone);

impl Zone {
    /// [`Zone`] of the UTC itself.
    pub const UTC: Self = Self(TimeZone::UTC);

    /// Looks up the [`Zone`] by its IANA name (e.g. `America/Santiago`).
    ///
    /// # Errors
    ///
    /// If the time zone database doesn't know the provided name.
    pub fn get(name: &str) -> Result<Self, UnknownZone> {
        TimeZone::get(name).map(Self).map_err(|_| UnknownZone {
            name: name.to_owned(),
        })
    }

    /// Creates a [`Zone`] always staying at the provided [`UtcOffset`].
    #[must_use]
    pub fn fixed(offset: UtcOffset) -> Self {
        Offset::from_seconds(offset.whole_seconds())
            .map_or(Self::UTC, |o| Self(TimeZone::fixed(o)))
    }

    /// Returns the [`UtcOffset`] in effect at the provided [`DateTime`].
    #[must_use]
    pub fn offset_at(&self, at: DateTime) -> UtcOffset {
        jiff::Timestamp::from_second(at.unix_timestamp())
            .ok()
            .and_then(|ts| {
                UtcOffset::from_whole_seconds(self.0.to_offset(ts).seconds())
                    .ok()
            })
            .unwrap_or(UtcOffset::UTC)
    }

    /// Returns the [`WallClock`] reading of the provided [`DateTime`] in this
    /// [`Zone`].
    #[must_use]
    pub fn wall_clock(&self, at: DateTime) -> WallClock {
        at.to_wall_clock(self.offset_at(at))
    }
}

/// Error of looking up a [`Zone`] not present in the time zone database.
#[derive(Clone, Debug, Display, Error)]
#[display("unknown time zone `{name}`")]
pub struct UnknownZone {
    /// Requested IANA name.
    pub name: String,
}

#[cfg(test)]
mod spec {
    use common::{Date, DateTime, Time};
    use time::UtcOffset;

    use super::{Zone, SANTIAGO};

    fn at(s: &str) -> DateTime {
        DateTime::from_rfc3339(s).unwrap()
    }

    #[test]
    fn follows_santiago_summer_time() {
        let zone = Zone::get(SANTIAGO).unwrap();

        let january = at("2026-01-15T13:30:00Z");
        assert_eq!(
            zone.offset_at(january),
            UtcOffset::from_hms(-3, 0, 0).unwrap(),
        );
        let local = zone.wall_clock(january);
        assert_eq!(local.date, "2026-01-15".parse::<Date>().unwrap());
        assert_eq!(local.time, Time::from_hm(10, 30).unwrap());

        let july = at("2026-07-15T13:30:00Z");
        assert_eq!(
            zone.offset_at(july),
            UtcOffset::from_hms(-4, 0, 0).unwrap(),
        );
        assert_eq!(zone.wall_clock(july).time, Time::from_hm(9, 30).unwrap());
    }

    #[test]
    fn shifts_date_around_midnight() {
        let zone = Zone::get(SANTIAGO).unwrap();

        let local = zone.wall_clock(at("2026-01-16T02:30:00Z"));
        assert_eq!(local.date, "2026-01-15".parse::<Date>().unwrap());
        assert_eq!(local.time, Time::from_hm(23, 30).unwrap());
    }

    #[test]
    fn stays_at_fixed_offset() {
        let zone = Zone::fixed(UtcOffset::from_hms(5, 0, 0).unwrap());

        assert_eq!(
            zone.wall_clock(at("2026-01-15T13:30:00Z")).time,
            Time::from_hm(18, 30).unwrap(),
        );
        assert_eq!(
            Zone::UTC.wall_clock(at("2026-01-15T13:30:00Z")).time,
            Time::from_hm(13, 30).unwrap(),
        );
    }

    #[test]
    fn rejects_unknown_name() {
        let err = Zone::get("Mars/Olympus_Mons").unwrap_err();

        assert_eq!(err.name, "Mars/Olympus_Mons");
    }
}
