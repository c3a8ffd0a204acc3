//! Background [`Task`]s definitions.

mod background;
pub mod expire_pending_appointments;
pub mod sync_settings;

pub use common::Handler as Task;

pub use self::{
    background::Background,
    expire_pending_appointments::ExpirePendingAppointments,
    sync_settings::SyncSettings,
};
