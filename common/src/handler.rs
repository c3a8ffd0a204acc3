//! [`Handler`] abstractions.

use std::future::Future;

/// Executor of an operation described by `Args`.
///
/// Every seam of the booking engine is a [`Handler`]: commands and queries of
/// the service, background tasks, database operations and payment gateway
/// calls. A single type implements it once per operation it supports, so
/// the required operations are spelled out in trait bounds.
pub trait Handler<Args = ()> {
    /// Result of a successfully executed operation.
    type Ok;

    /// Error of executing the operation.
    type Err;

    /// Executes the operation described by the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
