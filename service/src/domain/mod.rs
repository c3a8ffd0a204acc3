//! Domain definitions.

pub mod appointment;
pub mod availability;
pub mod client;
pub mod holiday;
pub mod lawyer;
pub mod pricing;
pub mod settings;
pub mod slot;
pub mod zone;

pub use self::{
    appointment::Appointment,
    availability::AvailabilityMap,
    holiday::HolidayCalendar,
    lawyer::Lawyer,
    pricing::Quote,
    settings::PlatformSettings,
    slot::{ConflictSet, Slot},
    zone::Zone,
};
