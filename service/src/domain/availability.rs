//! [`AvailabilityMap`] definitions.

use std::collections::HashMap;

use common::{Date, Time};
use serde_json::{Map, Value};
use tracing as log;
use unicode_normalization::{
    char::is_combining_mark, UnicodeNormalization as _,
};

/// Hour the first availability block of a day starts at.
pub const OPENING_HOUR: u8 = 9;

/// Number of hourly blocks in the default open window (`09:00`-`18:00`).
pub const DEFAULT_WINDOW_BLOCKS: usize = 9;

/// Canonical day of a week.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Weekday {
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl Weekday {
    /// All the [`Weekday`]s starting from Monday.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Returns the canonical key of this [`Weekday`], used when storing an
    /// [`AvailabilityMap`].
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Monday => "lunes",
            Self::Tuesday => "martes",
            Self::Wednesday => "miercoles",
            Self::Thursday => "jueves",
            Self::Friday => "viernes",
            Self::Saturday => "sabado",
            Self::Sunday => "domingo",
        }
    }
}

impl From<time::Weekday> for Weekday {
    fn from(day: time::Weekday) -> Self {
        use time::Weekday as W;

        match day {
            W::Monday => Self::Monday,
            W::Tuesday => Self::Tuesday,
            W::Wednesday => Self::Wednesday,
            W::Thursday => Self::Thursday,
            W::Friday => Self::Friday,
            W::Saturday => Self::Saturday,
            W::Sunday => Self::Sunday,
        }
    }
}

impl From<Date> for Weekday {
    fn from(date: Date) -> Self {
        date.weekday().into()
    }
}

/// Recognized spellings of [`Weekday`]s, already normalized.
///
/// Ordered by priority: when two stored keys resolve to the same [`Weekday`],
/// the spelling listed first wins.
const SPELLINGS: &[(&str, Weekday)] = &[
    ("lunes", Weekday::Monday),
    ("martes", Weekday::Tuesday),
    ("miercoles", Weekday::Wednesday),
    ("jueves", Weekday::Thursday),
    ("viernes", Weekday::Friday),
    ("sabado", Weekday::Saturday),
    ("domingo", Weekday::Sunday),
    ("monday", Weekday::Monday),
    ("tuesday", Weekday::Tuesday),
    ("wednesday", Weekday::Wednesday),
    ("thursday", Weekday::Thursday),
    ("friday", Weekday::Friday),
    ("saturday", Weekday::Saturday),
    ("sunday", Weekday::Sunday),
    ("lun", Weekday::Monday),
    ("mar", Weekday::Tuesday),
    ("mie", Weekday::Wednesday),
    ("jue", Weekday::Thursday),
    ("vie", Weekday::Friday),
    ("sab", Weekday::Saturday),
    ("dom", Weekday::Sunday),
    ("mon", Weekday::Monday),
    ("tue", Weekday::Tuesday),
    ("wed", Weekday::Wednesday),
    ("thu", Weekday::Thursday),
    ("fri", Weekday::Friday),
    ("sat", Weekday::Saturday),
    ("sun", Weekday::Sunday),
];

/// Normalizes the provided day name into its canonical [`Weekday`].
///
/// The name is brought to its compatibility decomposition, then diacritics
/// and non-letters are stripped and the case is ignored. So `"Miércoles"`,
/// `"miercoles"`, `"WEDNESDAY"` and `"ＷＥＤ"` all resolve to
/// [`Weekday::Wednesday`].
#[must_use]
pub fn normalize(day_name: &str) -> Option<Weekday> {
    lookup(day_name).map(|(_, day)| day)
}

/// Looks up the provided day name, returning its priority along with the
/// resolved [`Weekday`].
fn lookup(day_name: &str) -> Option<(usize, Weekday)> {
    let key = day_name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(char::is_ascii_alphabetic)
        .collect::<String>();
    SPELLINGS
        .iter()
        .position(|(spelling, _)| *spelling == key)
        .map(|pos| (pos, SPELLINGS[pos].1))
}

/// Weekly recurring availability of a lawyer.
///
/// Every declared [`Weekday`] maps to a sequence of hourly blocks, the first
/// one starting at [`OPENING_HOUR`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AvailabilityMap {
    /// Declared hourly blocks per [`Weekday`].
    days: HashMap<Weekday, Vec<bool>>,
}

impl AvailabilityMap {
    /// Creates a new [`AvailabilityMap`] out of the provided blocks.
    #[must_use]
    pub fn new(days: impl IntoIterator<Item = (Weekday, Vec<bool>)>) -> Self {
        Self {
            days: days.into_iter().collect(),
        }
    }

    /// Parses an [`AvailabilityMap`] from its stored JSON representation.
    ///
    /// Never fails:
    /// - keys not recognized as a day name are skipped;
    /// - non-boolean entries are considered unavailable blocks;
    /// - a non-array value declares the day without any open block.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                log::debug!("availability is not a JSON object: {value}");
            }
            return Self::default();
        };

        let mut days = HashMap::<Weekday, (usize, Vec<bool>)>::new();
        for (name, blocks) in object {
            let Some((priority, day)) = lookup(name) else {
                log::debug!("skipping unknown availability day `{name}`");
                continue;
            };
            if days.get(&day).is_some_and(|(p, _)| *p <= priority) {
                continue;
            }
            let blocks = blocks
                .as_array()
                .map(|flags| {
                    flags.iter().map(|f| f.as_bool() == Some(true)).collect()
                })
                .unwrap_or_default();
            _ = days.insert(day, (priority, blocks));
        }

        Self {
            days: days
                .into_iter()
                .map(|(day, (_, blocks))| (day, blocks))
                .collect(),
        }
    }

    /// Returns the JSON representation of this [`AvailabilityMap`] keyed by
    /// canonical [`Weekday::key()`]s.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for day in Weekday::ALL {
            if let Some(blocks) = self.days.get(&day) {
                _ = object.insert(
                    day.key().to_owned(),
                    Value::Array(blocks.iter().copied().map(Value::Bool).collect()),
                );
            }
        }
        Value::Object(object)
    }

    /// Returns the hourly blocks declared for the [`Weekday`] of the provided
    /// [`Date`].
    ///
    /// [`None`] means no availability was declared for that [`Weekday`].
    #[must_use]
    pub fn resolve(&self, date: Date) -> Option<&[bool]> {
        self.days.get(&Weekday::from(date)).map(Vec::as_slice)
    }
}

/// Returns the start [`Time`] of the hourly block at the provided index.
///
/// [`None`] is returned if the block would start after `23:00`.
#[must_use]
pub fn block_start(index: usize) -> Option<Time> {
    let hour = u8::try_from(index).ok()?.checked_add(OPENING_HOUR)?;
    Time::from_hm(hour, 0)
}

#[cfg(test)]
mod spec {
    use common::{Date, Time};
    use serde_json::json;

    use super::{block_start, normalize, AvailabilityMap, Weekday};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn normalizes_day_names() {
        assert_eq!(normalize("lunes"), Some(Weekday::Monday));
        assert_eq!(normalize("Monday"), Some(Weekday::Monday));
        assert_eq!(normalize("Miércoles"), Some(Weekday::Wednesday));
        assert_eq!(normalize("MIERCOLES"), Some(Weekday::Wednesday));
        assert_eq!(normalize(" sábado "), Some(Weekday::Saturday));
        assert_eq!(normalize("Sáb."), Some(Weekday::Saturday));
        assert_eq!(normalize("thu"), Some(Weekday::Thursday));
        assert_eq!(normalize("dom"), Some(Weekday::Sunday));

        assert_eq!(normalize(""), None);
        assert_eq!(normalize("weekend"), None);
        assert_eq!(normalize("lunes2"), Some(Weekday::Monday));
    }

    #[test]
    fn normalizes_compatibility_forms() {
        assert_eq!(normalize("ＬＵＮＥＳ"), Some(Weekday::Monday));
        assert_eq!(normalize("Mie\u{301}rcoles"), Some(Weekday::Wednesday));
        assert_eq!(normalize("ＳÁＢＡＤＯ"), Some(Weekday::Saturday));
        assert_eq!(normalize("ﬁ"), None);
    }

    #[test]
    fn resolves_by_weekday() {
        let map = AvailabilityMap::from_json(&json!({
            "Lunes": [true, false, true],
            "friday": [false, true],
        }));

        // 2099-06-01 is a Monday.
        assert_eq!(
            map.resolve(date("2099-06-01")),
            Some([true, false, true].as_slice()),
        );
        assert_eq!(
            map.resolve(date("2099-06-05")),
            Some([false, true].as_slice()),
        );
        assert_eq!(map.resolve(date("2099-06-02")), None);
    }

    #[test]
    fn tolerates_malformed_entries() {
        let map = AvailabilityMap::from_json(&json!({
            "martes": [true, "yes", 1, null, true],
            "jueves": "all day",
            "holiday": [true],
        }));

        assert_eq!(
            map.resolve(date("2099-06-02")),
            Some([true, false, false, false, true].as_slice()),
        );
        assert_eq!(map.resolve(date("2099-06-04")), Some([].as_slice()));

        assert_eq!(
            AvailabilityMap::from_json(&json!([true, true])),
            AvailabilityMap::default(),
        );
        assert_eq!(
            AvailabilityMap::from_json(&json!(null)),
            AvailabilityMap::default(),
        );
    }

    #[test]
    fn prefers_spanish_spelling_on_duplicates() {
        let map = AvailabilityMap::from_json(&json!({
            "monday": [false],
            "lunes": [true],
            "mon": [false, false],
        }));

        assert_eq!(
            map.resolve(date("2099-06-01")),
            Some([true].as_slice()),
        );
    }

    #[test]
    fn stores_canonical_keys() {
        let map = AvailabilityMap::from_json(&json!({
            "Miércoles": [true, false],
        }));

        assert_eq!(map.to_json(), json!({ "miercoles": [true, false] }));
        assert_eq!(AvailabilityMap::from_json(&map.to_json()), map);
    }

    #[test]
    fn computes_block_starts() {
        assert_eq!(block_start(0), Time::from_hm(9, 0));
        assert_eq!(block_start(8), Time::from_hm(17, 0));
        assert_eq!(block_start(14), Time::from_hm(23, 0));
        assert_eq!(block_start(15), None);
        assert_eq!(block_start(usize::MAX), None);
    }
}
