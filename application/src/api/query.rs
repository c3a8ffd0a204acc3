//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Lists the `Slot`s the lawyer may be booked at on the provided `Date`
    /// for a consultation of the provided length.
    ///
    /// Past dates, Sundays and holidays have no `Slot`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DURATION` - the duration is not a positive multiple of
    ///                        15 minutes up to 480 minutes;
    /// - `LAWYER_NOT_EXISTS` - the lawyer with the provided ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            date = %date,
            duration_minutes = duration_minutes,
            gql.name = "availableSlots",
            lawyer_id = %lawyer_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn available_slots(
        lawyer_id: api::lawyer::Id,
        date: Date,
        duration_minutes: i32,
        ctx: &Context,
    ) -> Result<Vec<api::Slot>, Error> {
        let duration = api::appointment::duration(duration_minutes, ctx)?;

        ctx.service()
            .execute(query::ListAvailableSlots {
                lawyer_id: lawyer_id.into(),
                date,
                duration,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|slots| slots.into_iter().map(Into::into).collect())
    }

    /// Prices a consultation of the client with the lawyer.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DURATION` - the duration is not a positive multiple of
    ///                        15 minutes up to 480 minutes;
    /// - `LAWYER_NOT_EXISTS` - the lawyer with the provided ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %client_id,
            duration_minutes = duration_minutes,
            gql.name = "priceQuote",
            lawyer_id = %lawyer_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn price_quote(
        lawyer_id: api::lawyer::Id,
        duration_minutes: i32,
        client_id: api::client::Id,
        ctx: &Context,
    ) -> Result<api::PriceQuote, Error> {
        let duration = api::appointment::duration(duration_minutes, ctx)?;

        let quote = ctx
            .service()
            .execute(query::QuotePrice {
                lawyer_id: lawyer_id.into(),
                client_id: client_id.into(),
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

        Ok(api::PriceQuote::new(quote, settings.platform_fee))
    }

    /// Returns the `Appointment` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPOINTMENT_NOT_EXISTS` - the `Appointment` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "appointment",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn appointment(
        id: api::appointment::Id,
        ctx: &Context,
    ) -> Result<api::Appointment, Error> {
        ctx.service()
            .execute(query::appointment::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| AppointmentError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `PlatformSettings` currently applied to the prices.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "platformSettings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn platform_settings(ctx: &Context) -> api::PlatformSettings {
        ctx.service()
            .execute(query::CurrentSettings)
            .await
            .unwrap_or_else(|e| match e {})
            .into()
    }
}

impl AsError for query::available_slots::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LawyerNotExists(_) => Some(LawyerError::NotExists.into()),
        }
    }
}

impl AsError for query::price_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LawyerNotExists(_) => Some(LawyerError::NotExists.into()),
        }
    }
}

define_error! {
    enum AppointmentError {
        #[code = "APPOINTMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Appointment` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum LawyerError {
        #[code = "LAWYER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Lawyer with the specified ID does not exist"]
        NotExists,
    }
}
