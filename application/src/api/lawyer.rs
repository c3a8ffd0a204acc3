//! Lawyer-related definitions.

use derive_more::{Display, From, Into};
use juniper::GraphQLScalar;
use service::domain;
use uuid::Uuid;

/// Unique identifier of a lawyer.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::lawyer::Id)]
#[into(domain::lawyer::Id)]
#[graphql(name = "LawyerId", transparent)]
pub struct Id(Uuid);
