//! [`Slot`] definition.

use common::Time;
use juniper::GraphQLObject;
use service::domain;

/// Time range a consultation may be booked at.
#[derive(Clone, Copy, Debug, GraphQLObject)]
pub struct Slot {
    /// `Time` the consultation starts at.
    pub start_time: Time,

    /// `Time` the consultation ends at.
    pub end_time: Time,
}

impl From<domain::Slot> for Slot {
    fn from(slot: domain::Slot) -> Self {
        Self {
            start_time: slot.start,
            end_time: slot.end,
        }
    }
}
