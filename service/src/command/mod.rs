//! [`Command`] definition.

pub mod cancel_appointment;
pub mod create_booking;
pub mod refresh_settings;
pub mod settle_payment;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_appointment::CancelAppointment, create_booking::CreateBooking,
    refresh_settings::RefreshSettings, settle_payment::SettlePayment,
};
