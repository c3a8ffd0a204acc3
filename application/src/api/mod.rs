//! GraphQL API definitions.

pub mod appointment;
pub mod client;
pub mod lawyer;
mod mutation;
mod query;
pub mod quote;
pub mod settings;
pub mod slot;

use juniper::EmptySubscription;

use crate::Context;

pub use self::{
    appointment::{Appointment, Booking},
    mutation::Mutation,
    query::Query,
    quote::PriceQuote,
    settings::PlatformSettings,
    slot::Slot,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;
