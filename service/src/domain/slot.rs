//! [`Slot`] definitions and their generation.

use std::collections::BTreeSet;

use common::{Date, Time, WallClock};
use derive_more::{Display, From, Into};

use crate::domain::{
    appointment::Duration,
    availability::{self, AvailabilityMap, DEFAULT_WINDOW_BLOCKS},
    lawyer, HolidayCalendar,
};

/// Bookable time range of a lawyer's day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Slot {
    /// [`Time`] this [`Slot`] starts at.
    pub start: Time,

    /// [`Time`] this [`Slot`] ends at.
    pub end: Time,

    /// [`Status`] of this [`Slot`].
    pub status: Status,
}

impl Slot {
    /// Indicates whether this [`Slot`] may be booked.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == Status::Available
    }
}

/// Status of a [`Slot`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Status {
    /// [`Slot`] may be booked.
    Available,

    /// [`Slot`] is already taken by a non-cancelled appointment.
    Booked,

    /// [`Slot`] starts at or before the current time.
    Past,
}

/// Day of a lawyer's schedule.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Day {
    /// ID of the lawyer.
    pub lawyer_id: lawyer::Id,

    /// [`Date`] of the day.
    pub date: Date,
}

/// Start [`Time`]s already taken on a [`Day`].
#[derive(Clone, Debug, Default, Eq, From, Into, PartialEq)]
pub struct ConflictSet(BTreeSet<Time>);

impl ConflictSet {
    /// Indicates whether the provided start [`Time`] is taken.
    #[must_use]
    pub fn contains(&self, start: Time) -> bool {
        self.0.contains(&start)
    }
}

impl FromIterator<Time> for ConflictSet {
    fn from_iter<I: IntoIterator<Item = Time>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Indicates whether anything may be booked on the provided [`Date`] at all.
///
/// Past dates, Sundays and holidays are never bookable.
#[must_use]
pub fn is_bookable(
    date: Date,
    holidays: &HolidayCalendar,
    now: WallClock,
) -> bool {
    date >= now.date
        && date.weekday() != time::Weekday::Sunday
        && !holidays.is_holiday(date)
}

/// Generator of a lawyer's [`Slot`]s.
#[derive(Clone, Copy, Debug)]
pub struct Generator<'a> {
    /// Declared weekly availability of the lawyer.
    ///
    /// [`None`] if it couldn't be read, so the default window applies.
    pub availability: Option<&'a AvailabilityMap>,

    /// Non-bookable holidays.
    pub holidays: &'a HolidayCalendar,

    /// Already taken start [`Time`]s of the generated day.
    pub booked: &'a ConflictSet,
}

impl Generator<'_> {
    /// Generates all the [`Slot`]s of the provided [`Date`] for the provided
    /// [`Duration`], ordered by their start.
    ///
    /// One candidate is produced for every open hourly block. Candidates
    /// ending after midnight are dropped.
    #[must_use]
    pub fn generate(
        &self,
        date: Date,
        duration: Duration,
        now: WallClock,
    ) -> Vec<Slot> {
        if !is_bookable(date, self.holidays, now) {
            return vec![];
        }

        let default_window = [true; DEFAULT_WINDOW_BLOCKS];
        let blocks = self
            .availability
            .and_then(|a| a.resolve(date))
            .unwrap_or(&default_window);

        let mut slots = blocks
            .iter()
            .enumerate()
            .filter(|(_, open)| **open)
            .map_while(|(i, _)| availability::block_start(i))
            .filter_map(|start| {
                let end = start.checked_add_minutes(duration.minutes())?;
                let status = if self.booked.contains(start) {
                    Status::Booked
                } else if date == now.date && start <= now.time {
                    Status::Past
                } else {
                    Status::Available
                };
                Some(Slot { start, end, status })
            })
            .collect::<Vec<_>>();
        slots.sort_by_key(|s| s.start);
        slots
    }

    /// Generates only the [`Slot`]s which may be booked.
    #[must_use]
    pub fn available(
        &self,
        date: Date,
        duration: Duration,
        now: WallClock,
    ) -> Vec<Slot> {
        let mut slots = self.generate(date, duration, now);
        slots.retain(Slot::is_available);
        slots
    }
}

#[cfg(test)]
mod spec {
    use common::{Date, Time, WallClock};
    use serde_json::json;

    use crate::domain::{
        appointment::Duration, AvailabilityMap, HolidayCalendar,
    };

    use super::{ConflictSet, Generator, Slot, Status};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn time(s: &str) -> Time {
        s.parse().unwrap()
    }

    fn at(d: &str, t: &str) -> WallClock {
        WallClock {
            date: date(d),
            time: time(t),
        }
    }

    fn minutes(m: u16) -> Duration {
        Duration::new(m).unwrap()
    }

    fn starts(slots: &[Slot]) -> Vec<String> {
        slots.iter().map(|s| s.start.to_string()).collect()
    }

    // 2099-06-01 is a Monday.
    const MONDAY: &str = "2099-06-01";

    #[test]
    fn uses_default_window_without_declared_availability() {
        let holidays = HolidayCalendar::chile();
        let booked = ConflictSet::default();
        let map = AvailabilityMap::default();

        for availability in [None, Some(&map)] {
            let slots = Generator {
                availability,
                holidays: &holidays,
                booked: &booked,
            }
            .available(date(MONDAY), Duration::HOUR, at("2099-01-01", "12:00"));

            assert_eq!(
                starts(&slots),
                [
                    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00",
                    "15:00", "16:00", "17:00",
                ],
            );
            assert_eq!(slots.last().map(|s| s.end), Some(time("18:00")));
        }
    }

    #[test]
    fn follows_declared_blocks() {
        let holidays = HolidayCalendar::chile();
        let booked = ConflictSet::default();
        let map = AvailabilityMap::from_json(&json!({
            "lunes": [false, true, "x", true, null, false, true],
        }));

        let slots = Generator {
            availability: Some(&map),
            holidays: &holidays,
            booked: &booked,
        }
        .available(date(MONDAY), minutes(90), at("2099-01-01", "12:00"));

        assert_eq!(starts(&slots), ["10:00", "12:00", "15:00"]);
        assert_eq!(slots[0].end, time("11:30"));
        assert_eq!(slots[2].end, time("16:30"));
    }

    #[test]
    fn declared_empty_day_has_no_slots() {
        let holidays = HolidayCalendar::chile();
        let booked = ConflictSet::default();
        let map = AvailabilityMap::from_json(&json!({ "monday": [] }));

        let slots = Generator {
            availability: Some(&map),
            holidays: &holidays,
            booked: &booked,
        }
        .generate(date(MONDAY), Duration::HOUR, at("2099-01-01", "12:00"));

        assert!(slots.is_empty());
    }

    #[test]
    fn rejects_sundays_holidays_and_past_dates() {
        let holidays = HolidayCalendar::chile();
        let booked = ConflictSet::default();
        let map = AvailabilityMap::from_json(&json!({
            "domingo": [true, true],
            "viernes": [true, true],
        }));
        let generator = Generator {
            availability: Some(&map),
            holidays: &holidays,
            booked: &booked,
        };
        let now = at("2099-01-01", "08:00");

        // Sunday.
        assert!(generator.generate(date("2099-06-07"), Duration::HOUR, now)
            .is_empty());
        // Good Friday.
        assert!(generator.generate(date("2099-04-10"), Duration::HOUR, now)
            .is_empty());
        // Past date.
        assert!(generator
            .generate(date(MONDAY), Duration::HOUR, at("2099-06-02", "08:00"))
            .is_empty());
        // Regular Friday.
        assert_eq!(
            generator
                .generate(date("2099-06-05"), Duration::HOUR, now)
                .len(),
            2,
        );
    }

    #[test]
    fn marks_booked_starts() {
        let holidays = HolidayCalendar::chile();
        let booked = [time("10:00"), time("14:00"), time("10:30")]
            .into_iter()
            .collect::<ConflictSet>();
        let generator = Generator {
            availability: None,
            holidays: &holidays,
            booked: &booked,
        };
        let now = at("2099-01-01", "08:00");

        let all = generator.generate(date(MONDAY), Duration::HOUR, now);
        assert_eq!(all.len(), 9);
        assert_eq!(
            all.iter()
                .filter(|s| s.status == Status::Booked)
                .map(|s| s.start.to_string())
                .collect::<Vec<_>>(),
            ["10:00", "14:00"],
        );

        let available = generator.available(date(MONDAY), Duration::HOUR, now);
        assert_eq!(available.len(), 7);
        assert!(available.iter().all(|s| s.start != time("10:00")));
    }

    #[test]
    fn marks_past_starts_of_today() {
        let holidays = HolidayCalendar::chile();
        let booked = ConflictSet::default();
        let generator = Generator {
            availability: None,
            holidays: &holidays,
            booked: &booked,
        };

        let slots =
            generator.generate(date(MONDAY), Duration::HOUR, at(MONDAY, "12:00"));
        assert_eq!(
            slots
                .iter()
                .filter(|s| s.status == Status::Past)
                .map(|s| s.start.to_string())
                .collect::<Vec<_>>(),
            ["09:00", "10:00", "11:00", "12:00"],
        );

        let available =
            generator.available(date(MONDAY), Duration::HOUR, at(MONDAY, "12:01"));
        assert_eq!(available.first().map(|s| s.start), Some(time("13:00")));
    }

    #[test]
    fn drops_slots_ending_after_midnight() {
        let holidays = HolidayCalendar::chile();
        let booked = ConflictSet::default();
        let map = AvailabilityMap::from_json(&json!({
            "lunes": vec![true; 20],
        }));

        let slots = Generator {
            availability: Some(&map),
            holidays: &holidays,
            booked: &booked,
        }
        .generate(date(MONDAY), minutes(120), at("2099-01-01", "08:00"));

        assert_eq!(slots.first().map(|s| s.start), Some(time("09:00")));
        assert_eq!(slots.last().map(|s| s.start), Some(time("22:00")));
        assert_eq!(slots.last().map(|s| s.end), Some(Time::END_OF_DAY));
        assert_eq!(slots.len(), 14);
    }

    #[test]
    fn is_ordered_unique_and_idempotent() {
        let holidays = HolidayCalendar::chile();
        let booked = [time("11:00")].into_iter().collect::<ConflictSet>();
        let map = AvailabilityMap::from_json(&json!({
            "Monday": [true, true, false, true, true, true],
        }));
        let generator = Generator {
            availability: Some(&map),
            holidays: &holidays,
            booked: &booked,
        };
        let now = at(MONDAY, "09:30");

        let first = generator.generate(date(MONDAY), minutes(45), now);
        let second = generator.generate(date(MONDAY), minutes(45), now);
        assert_eq!(first, second);

        assert!(first.windows(2).all(|w| w[0].start < w[1].start));
        for s in &first {
            assert_eq!(
                s.end.minutes_since_midnight()
                    - s.start.minutes_since_midnight(),
                45,
            );
        }
    }
}
