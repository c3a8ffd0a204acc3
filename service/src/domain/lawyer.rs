//! [`Lawyer`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::AvailabilityMap;

/// Lawyer offering consultations.
#[derive(Clone, Debug)]
pub struct Lawyer {
    /// ID of this [`Lawyer`].
    pub id: Id,

    /// [`HourlyRate`] of this [`Lawyer`].
    pub hourly_rate: HourlyRate,

    /// Weekly recurring [`AvailabilityMap`] of this [`Lawyer`].
    pub availability: AvailabilityMap,
}

/// ID of a [`Lawyer`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Base price of one hour of a [`Lawyer`]'s consultation, in the platform
/// currency.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct HourlyRate(Decimal);

impl HourlyRate {
    /// Creates a new [`HourlyRate`] if the provided amount is non-negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Returns the amount of this [`HourlyRate`].
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }
}
