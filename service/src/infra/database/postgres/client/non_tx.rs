//! [`NonTx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{
        connection::{self, Params},
        traced, Connection,
    },
};

use super::delegate_to_connection;

/// Postgres database client running every statement on its own, outside of
/// any transaction.
///
/// The pooled [`connection::NonTx`] is checked out on the first statement
/// and then reused by all the clones of this client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to check the [`connection::NonTx`] out of.
    pub(crate) pool: connection::Pool,

    /// Checked out [`connection::NonTx`], if any.
    checked_out: Arc<RwLock<Option<connection::NonTx>>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            checked_out: Arc::default(),
        }
    }

    /// Returns the checked out [`connection::NonTx`], checking one out of the
    /// [`connection::Pool`] if there is none yet.
    pub(crate) async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        let current = self.checked_out.read().await;
        if current.is_some() {
            return Ok(RwLockReadGuard::map(current, |c| {
                c.as_ref().expect("checked above")
            }));
        }
        drop(current);

        let mut slot = self.checked_out.write().await;
        if slot.is_none() {
            *slot = Some(self.pool.get().await.map_err(traced)?);
        }
        Ok(RwLockReadGuard::map(slot.downgrade(), |c| {
            c.as_ref().expect("just checked out")
        }))
    }

    /// Takes the checked out [`connection::NonTx`] away from this client.
    ///
    /// The next statement run on this client checks out a new one.
    #[must_use]
    pub(crate) async fn take_connection(&self) -> Option<connection::NonTx> {
        self.checked_out.write().await.take()
    }
}

delegate_to_connection!(NonTx);
