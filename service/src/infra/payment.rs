//! Payment [`Gateway`]-related implementations.

use common::{define_kind, operations::Perform, Money};
use derive_more::{Display, Error as StdError, From, Into};
use tracerr::Traced;
use tracing as log;

use crate::domain::appointment;

/// Payment gateway operation.
pub use common::Handler as Gateway;

/// Request to start paying for an appointment.
#[derive(Clone, Copy, Debug)]
pub struct Checkout {
    /// ID of the appointment being paid.
    pub appointment_id: appointment::Id,

    /// Amount to be paid.
    pub amount: Money,
}

/// URL the client is redirected to for completing a [`Checkout`].
#[derive(Clone, Debug, Display, Eq, From, Into, PartialEq)]
pub struct RedirectUrl(String);

define_kind! {
    #[doc = "Outcome of a payment reported by a [`Gateway`]."]
    enum Outcome {
        #[doc = "Payment succeeded."]
        Succeeded = 1,

        #[doc = "Payment failed or was aborted."]
        Failed = 2,

        #[doc = "Payment is still being processed."]
        Pending = 3,
    }
}

/// [`Gateway`] error.
#[derive(Clone, Debug, Display, StdError)]
pub enum Error {
    /// [`Gateway`] is not configured.
    #[display("payment gateway is not configured")]
    NotConfigured,

    /// [`Gateway`] refused to start a [`Checkout`].
    #[display("`Checkout` rejected: {_0}")]
    Rejected(#[error(not(source))] String),
}

/// [`Gateway`] redirecting clients to a hosted checkout page.
#[derive(Clone, Debug)]
pub struct Redirect {
    /// Base URL of the hosted checkout page.
    pub base_url: String,
}

impl Gateway<Perform<Checkout>> for Redirect {
    type Ok = RedirectUrl;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(checkout): Perform<Checkout>,
    ) -> Result<Self::Ok, Self::Err> {
        let Checkout {
            appointment_id,
            amount,
        } = checkout;

        if self.base_url.is_empty() {
            return Err(tracerr::new!(Error::NotConfigured));
        }

        let url = format!(
            "{}?appointment={appointment_id}&amount={}&currency={}",
            self.base_url,
            amount.amount.normalize(),
            amount.currency,
        );
        log::debug!("`Checkout` of `Appointment(id: {appointment_id})`: {url}");
        Ok(RedirectUrl(url))
    }
}
