//! Abstract operations executed by [`Handler`]s.
//!
//! An operation only describes the intent, the [`Handler`] it's executed by
//! decides how to fulfill it: a database writes rows, a payment gateway calls
//! its provider, a service runs its business logic.

use std::marker::PhantomData;

use crate::Handler;

/// Operation storing a new value.
///
/// Fails if the value clashes with an already stored one.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation changing an already stored value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Operation reading a value, usually described with [`By`].
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation guarding a value from concurrent changes until the current
/// transaction ends.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Operation starting a long-running process, like a background task.
#[derive(Clone, Copy, Debug)]
pub struct Start<T>(pub T);

/// Operation performing a call to an external system, like a payment
/// checkout.
#[derive(Clone, Copy, Debug)]
pub struct Perform<T>(pub T);

/// Operation opening a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// [`Handler`] executing operations inside a [`Transact`]ion.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Operation committing the current transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Description of a `W` value identified by a `B` value.
///
/// ```rust
/// # use common::operations::By;
/// // Appointments booked on the day of the lawyer with ID `7`.
/// struct Appointments;
///
/// let by = By::<Appointments, _>::new((7, "2099-06-01"));
/// assert_eq!(by.into_inner(), (7, "2099-06-01"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the described value.
    _what: PhantomData<W>,

    /// Value identifying the described one.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] out of the identifying value.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Consumes this [`By`] returning the identifying value.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
