//! [`Appointment`]-related definitions.

use common::{Date, DateTime, Money, Time};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{command::create_booking, domain, infra::payment};
use uuid::Uuid;

use crate::{api, define_error, Context, Error};

/// A booked consultation.
#[derive(Clone, Debug, From)]
pub struct Appointment(domain::Appointment);

/// A booked consultation.
#[graphql_object(context = Context)]
impl Appointment {
    /// Unique identifier of this `Appointment`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// ID of the lawyer giving the consultation.
    #[must_use]
    pub fn lawyer_id(&self) -> api::lawyer::Id {
        self.0.lawyer_id.into()
    }

    /// ID of the client taking the consultation.
    #[must_use]
    pub fn client_id(&self) -> api::client::Id {
        self.0.client_id.into()
    }

    /// `Date` of the consultation in the lawyer's wall clock.
    #[must_use]
    pub fn date(&self) -> Date {
        self.0.date
    }

    /// `Time` the consultation starts at.
    #[must_use]
    pub fn start_time(&self) -> Time {
        self.0.start
    }

    /// Length of the consultation in minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> i32 {
        self.0.duration.minutes().into()
    }

    /// Current `AppointmentStatus`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Price the client pays.
    #[must_use]
    pub fn price(&self) -> Money {
        self.0.price
    }

    /// Indicates whether this is the client's first consultation with the
    /// lawyer.
    #[must_use]
    pub fn is_first_consultation(&self) -> bool {
        self.0.is_first_consultation
    }

    /// `DateTime` when this `Appointment` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `Appointment` was last changed.
    #[must_use]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of an `Appointment`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::appointment::Id)]
#[into(domain::appointment::Id)]
#[graphql(name = "AppointmentId", transparent)]
pub struct Id(Uuid);

/// Status of an `Appointment`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "AppointmentStatus")]
pub enum Status {
    /// Waiting for the payment.
    PendingPayment,

    /// Paid.
    Confirmed,

    /// Cancelled, its slot is free again.
    Cancelled,
}

impl From<domain::appointment::Status> for Status {
    fn from(status: domain::appointment::Status) -> Self {
        use domain::appointment::Status as S;
        match status {
            S::PendingPayment => Self::PendingPayment,
            S::Confirmed => Self::Confirmed,
            S::Cancelled => Self::Cancelled,
        }
    }
}

/// Outcome of a payment reported by the payment provider.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum PaymentOutcome {
    /// Payment succeeded.
    Succeeded,

    /// Payment failed or was aborted.
    Failed,

    /// Payment is still being processed.
    Pending,
}

impl From<PaymentOutcome> for payment::Outcome {
    fn from(outcome: PaymentOutcome) -> Self {
        match outcome {
            PaymentOutcome::Succeeded => Self::Succeeded,
            PaymentOutcome::Failed => Self::Failed,
            PaymentOutcome::Pending => Self::Pending,
        }
    }
}

/// Result of booking a consultation.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct Booking {
    /// Created `Appointment` waiting for the payment.
    pub appointment: Appointment,

    /// `PriceQuote` the `Appointment` is priced with.
    pub quote: api::PriceQuote,

    /// URL the client completes the payment at.
    pub checkout_url: String,
}

impl Booking {
    /// Creates a new [`Booking`] out of the [`create_booking::Booking`],
    /// reporting the lawyer payout with the provided platform fee.
    #[must_use]
    pub fn new(
        booking: create_booking::Booking,
        platform_fee: common::Percent,
    ) -> Self {
        let create_booking::Booking {
            appointment,
            quote,
            checkout,
        } = booking;
        Self {
            appointment: appointment.into(),
            quote: api::PriceQuote::new(quote, platform_fee),
            checkout_url: checkout.into(),
        }
    }
}

/// Parses the provided number of minutes into a consultation
/// [`domain::appointment::Duration`].
///
/// # Errors
///
/// If the number of minutes is not a positive multiple of `15` up to `480`.
pub fn duration(
    minutes: i32,
    ctx: &Context,
) -> Result<domain::appointment::Duration, Error> {
    define_error! {
        enum InputError {
            #[code = "INVALID_DURATION"]
            #[status = BAD_REQUEST]
            #[message = "Duration must be a positive multiple of 15 minutes \
                         not exceeding 480 minutes"]
            Duration,
        }
    }

    domain::appointment::Duration::try_from(minutes)
        .map_err(|_| InputError::Duration.into())
        .map_err(ctx.error())
}
