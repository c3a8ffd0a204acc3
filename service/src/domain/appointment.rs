//! [`Appointment`] definitions.

use common::{define_kind, unit, Date, DateTime, DateTimeOf, Money, Time};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{client, lawyer};

/// Consultation booked by a client with a lawyer.
#[derive(Clone, Debug)]
pub struct Appointment {
    /// ID of this [`Appointment`].
    pub id: Id,

    /// ID of the lawyer giving the consultation.
    pub lawyer_id: lawyer::Id,

    /// ID of the client who booked this [`Appointment`].
    pub client_id: client::Id,

    /// Lawyer-local [`Date`] of this [`Appointment`].
    pub date: Date,

    /// Lawyer-local [`Time`] this [`Appointment`] starts at.
    pub start: Time,

    /// [`Duration`] of this [`Appointment`].
    pub duration: Duration,

    /// Current [`Status`] of this [`Appointment`].
    pub status: Status,

    /// Total price the client pays for this [`Appointment`].
    pub price: Money,

    /// Indicator whether this [`Appointment`] was priced as the first
    /// consultation between the client and the lawyer.
    pub is_first_consultation: bool,

    /// [`DateTime`] when this [`Appointment`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Appointment`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Appointment {
    /// Indicates whether this [`Appointment`] still occupies its slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != Status::Cancelled
    }

    /// Moves this [`Appointment`] into the provided [`Status`], returning the
    /// [`StatusChange`] to be persisted.
    ///
    /// [`None`] is returned if this [`Appointment`] is already in that
    /// [`Status`].
    ///
    /// # Errors
    ///
    /// If the transition is not allowed.
    pub fn transition(
        &mut self,
        to: Status,
    ) -> Result<Option<StatusChange>, TransitionError> {
        let from = self.status;
        if from == to {
            return Ok(None);
        }
        if !from.can_become(to) {
            return Err(TransitionError { from, to });
        }

        self.status = to;
        self.updated_at = DateTime::now().coerce();
        Ok(Some(StatusChange {
            id: self.id,
            from,
            to,
            at: self.updated_at,
        }))
    }
}

/// Change of a stored [`Appointment`]'s [`Status`].
///
/// Applies only while the stored [`Appointment`] is still in the
/// [`StatusChange::from`] [`Status`], so a concurrent change is never
/// overwritten.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusChange {
    /// ID of the changed [`Appointment`].
    pub id: Id,

    /// [`Status`] the [`Appointment`] is expected to be in.
    pub from: Status,

    /// New [`Status`] of the [`Appointment`].
    pub to: Status,

    /// [`DateTime`] of the change.
    pub at: ModificationDateTime,
}

/// Indicator whether a [`StatusChange`] was applied.
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct Applied(pub bool);

/// ID of an [`Appointment`].
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

/// Duration of an [`Appointment`] in whole minutes.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("{_0}min")]
pub struct Duration(u16);

impl Duration {
    /// Granularity of a [`Duration`] in minutes.
    pub const STEP: u16 = 15;

    /// Longest allowed [`Duration`] in minutes.
    pub const MAX: u16 = 8 * 60;

    /// One hour [`Duration`].
    pub const HOUR: Self = Self(60);

    /// Creates a new [`Duration`] if the provided number of minutes is a
    /// positive multiple of [`Duration::STEP`] not exceeding
    /// [`Duration::MAX`].
    #[must_use]
    pub fn new(minutes: u16) -> Option<Self> {
        (minutes > 0 && minutes % Self::STEP == 0 && minutes <= Self::MAX)
            .then_some(Self(minutes))
    }

    /// Returns the number of minutes in this [`Duration`].
    #[must_use]
    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl TryFrom<i32> for Duration {
    type Error = &'static str;

    fn try_from(minutes: i32) -> Result<Self, Self::Error> {
        const ERR: &str = "duration must be a positive multiple of 15 \
                           minutes not exceeding 480 minutes";

        u16::try_from(minutes)
            .ok()
            .and_then(Self::new)
            .ok_or(ERR)
    }
}

define_kind! {
    #[doc = "Status of an [`Appointment`]."]
    enum Status {
        #[doc = "Created and waiting for the payment."]
        PendingPayment = 1,

        #[doc = "Paid."]
        Confirmed = 2,

        #[doc = "Cancelled, payment failed or timed out."]
        Cancelled = 3,
    }
}

impl Status {
    /// Indicates whether this [`Status`] may be changed into the provided
    /// one.
    #[must_use]
    pub fn can_become(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::PendingPayment, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled),
        )
    }
}

/// Error of an [`Appointment`]'s [`Status`] transition.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`{from}` status cannot become `{to}`")]
pub struct TransitionError {
    /// [`Status`] the transition started from.
    pub from: Status,

    /// Requested [`Status`].
    pub to: Status,
}

/// Client and lawyer of a consultation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Parties {
    /// ID of the client.
    pub client_id: client::Id,

    /// ID of the lawyer.
    pub lawyer_id: lawyer::Id,
}

/// Indicator whether the next consultation between [`Parties`] is their
/// first one, i.e. the client has no non-cancelled [`Appointment`] with the
/// lawyer.
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct FirstConsultation(pub bool);

/// IDs of [`Appointment`]s cancelled for waiting for the payment too long.
#[derive(Clone, Debug, Default, Eq, From, Into, PartialEq)]
pub struct Expired(pub Vec<Id>);

/// [`DateTime`] when an [`Appointment`] was created.
pub type CreationDateTime = DateTimeOf<(Appointment, unit::Creation)>;

/// [`DateTime`] when an [`Appointment`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Appointment, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{client, lawyer};

    use super::{Appointment, Duration, Id, Status};

    fn pending() -> Appointment {
        Appointment {
            id: Id::new(),
            lawyer_id: lawyer::Id::new(),
            client_id: client::Id::new(),
            date: "2099-06-01".parse().unwrap(),
            start: "10:00".parse().unwrap(),
            duration: Duration::HOUR,
            status: Status::PendingPayment,
            price: Money {
                amount: Decimal::from(1000),
                currency: Currency::Clp,
            },
            is_first_consultation: false,
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn validates_duration() {
        assert_eq!(Duration::new(60), Some(Duration::HOUR));
        assert_eq!(Duration::new(30).map(Duration::minutes), Some(30));
        assert_eq!(Duration::new(480).map(Duration::minutes), Some(480));

        assert_eq!(Duration::new(0), None);
        assert_eq!(Duration::new(20), None);
        assert_eq!(Duration::new(495), None);
        assert!(Duration::try_from(-60).is_err());
        assert!(Duration::try_from(90).is_ok());
    }

    #[test]
    fn allows_only_forward_transitions() {
        use Status as S;

        assert!(S::PendingPayment.can_become(S::Confirmed));
        assert!(S::PendingPayment.can_become(S::Cancelled));
        assert!(S::Confirmed.can_become(S::Cancelled));

        assert!(!S::Confirmed.can_become(S::PendingPayment));
        assert!(!S::Cancelled.can_become(S::PendingPayment));
        assert!(!S::Cancelled.can_become(S::Confirmed));
        assert!(!S::PendingPayment.can_become(S::PendingPayment));
    }

    #[test]
    fn reports_status_change() {
        let mut appointment = pending();

        let change = appointment
            .transition(Status::Confirmed)
            .unwrap()
            .unwrap();
        assert_eq!(change.id, appointment.id);
        assert_eq!(change.from, Status::PendingPayment);
        assert_eq!(change.to, Status::Confirmed);
        assert_eq!(change.at, appointment.updated_at);
        assert_eq!(appointment.status, Status::Confirmed);

        assert!(appointment.transition(Status::Confirmed).unwrap().is_none());
        assert!(appointment.transition(Status::PendingPayment).is_err());
    }
}
