//! GraphQL [`Mutation`]s definitions.

use common::{Date, Time};
use juniper::graphql_object;
use service::{command, query, Command as _, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Books a consultation with the lawyer.
    ///
    /// The created `Appointment` waits for the payment, which should be
    /// completed at the returned checkout URL.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DURATION` - the duration is not a positive multiple of
    ///                        15 minutes up to 480 minutes;
    /// - `LAWYER_NOT_EXISTS` - the lawyer with the provided ID does not
    ///                         exist;
    /// - `SLOT_UNAVAILABLE` - the requested slot is not offered or is taken
    ///                        already;
    /// - `PAYMENT_FAILED` - the payment provider failed to start a checkout.
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %client_id,
            date = %date,
            duration_minutes = duration_minutes,
            gql.name = "createBooking",
            lawyer_id = %lawyer_id,
            otel.name = Self::SPAN_NAME,
            start_time = %start_time,
        ),
    )]
    pub async fn create_booking(
        lawyer_id: api::lawyer::Id,
        client_id: api::client::Id,
        date: Date,
        start_time: Time,
        duration_minutes: i32,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let duration = api::appointment::duration(duration_minutes, ctx)?;

        let booking = ctx
            .service()
            .execute(command::CreateBooking {
                lawyer_id: lawyer_id.into(),
                client_id: client_id.into(),
                date,
                start: start_time,
                duration,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let settings = ctx
            .service()
            .execute(query::CurrentSettings)
            .await
            .unwrap_or_else(|e| match e {});

        Ok(api::Booking::new(booking, settings.platform_fee))
    }

    /// Settles the payment of the `Appointment` with the reported
    /// `PaymentOutcome`.
    ///
    /// Repeated reports of the same `PaymentOutcome` change nothing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPOINTMENT_NOT_EXISTS` - the `Appointment` with the provided ID
    ///                              does not exist;
    /// - `INVALID_TRANSITION` - the `Appointment` cannot accept the reported
    ///                          `PaymentOutcome` anymore, or was changed
    ///                          concurrently.
    #[tracing::instrument(
        skip_all,
        fields(
            appointment_id = %appointment_id,
            gql.name = "settlePayment",
            otel.name = Self::SPAN_NAME,
            outcome = ?outcome,
        ),
    )]
    pub async fn settle_payment(
        appointment_id: api::appointment::Id,
        outcome: api::appointment::PaymentOutcome,
        ctx: &Context,
    ) -> Result<api::Appointment, Error> {
        ctx.service()
            .execute(command::SettlePayment {
                appointment_id: appointment_id.into(),
                outcome: outcome.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Appointment`, making its slot available again.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPOINTMENT_NOT_EXISTS` - the `Appointment` with the provided ID
    ///                              does not exist;
    /// - `INVALID_TRANSITION` - the `Appointment` is cancelled already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelAppointment",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_appointment(
        id: api::appointment::Id,
        ctx: &Context,
    ) -> Result<api::Appointment, Error> {
        ctx.service()
            .execute(command::CancelAppointment {
                appointment_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Reloads the `PlatformSettings` from the storage.
    ///
    /// The last known `PlatformSettings` are kept if none are stored.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "refreshPlatformSettings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn refresh_platform_settings(
        ctx: &Context,
    ) -> Result<api::PlatformSettings, Error> {
        ctx.service()
            .execute(command::RefreshSettings)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum SlotError {
        #[code = "SLOT_UNAVAILABLE"]
        #[status = CONFLICT]
        #[message = "Requested slot is not available, select another one"]
        Unavailable,
    }
}

define_error! {
    enum TransitionError {
        #[code = "INVALID_TRANSITION"]
        #[status = CONFLICT]
        #[message = "`Appointment` cannot change its status this way"]
        Invalid,
    }
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LAWYER_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "Lawyer with the specified ID does not exist"]
                LawyerNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::LawyerNotExists(_) => Error::LawyerNotExists.into(),
            Self::Payment(e) => return e.try_as_error(),
            Self::SlotTaken(_) | Self::SlotUnavailable(_) => {
                SlotError::Unavailable.into()
            }
            Self::Transition(_) => TransitionError::Invalid.into(),
        })
    }
}

impl AsError for command::settle_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::AppointmentCancelled(_)
            | Self::AppointmentConfirmed(_)
            | Self::Conflict(_)
            | Self::Transition(_) => TransitionError::Invalid.into(),
            Self::AppointmentNotExists(_) => {
                api::query::AppointmentError::NotExists.into()
            }
            Self::Db(e) => return e.try_as_error(),
        })
    }
}

impl AsError for command::cancel_appointment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::AppointmentCancelled(_)
            | Self::Conflict(_)
            | Self::Transition(_) => TransitionError::Invalid.into(),
            Self::AppointmentNotExists(_) => {
                api::query::AppointmentError::NotExists.into()
            }
            Self::Db(e) => return e.try_as_error(),
        })
    }
}

impl AsError for command::refresh_settings::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}
