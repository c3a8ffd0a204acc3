//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{Row, ToStatement};
use tracerr::Traced;
use tracing as log;

use crate::infra::database::{
    self,
    postgres::{
        connection::{self, Params},
        traced, Connection,
    },
};

use super::{delegate_to_connection, NonTx};

/// Postgres database client running every statement inside a single
/// transaction.
///
/// The transaction begins on the first statement, reusing the connection
/// of the [`NonTx`] client it was created from when there is one, and lasts
/// until [`Tx::commit()`].
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to check a connection out of.
    pool: connection::Pool,

    /// State shared by all the clones of this client.
    shared: Arc<Shared>,
}

/// State of a [`Tx`] client shared by all its clones.
#[derive(Debug)]
struct Shared {
    /// [`NonTx`] client to take the connection of, until the transaction
    /// begins.
    origin: RwLock<Option<NonTx>>,

    /// Transaction, once it began.
    tx: RwLock<Option<connection::Tx>>,
}

impl Tx {
    /// Creates a new [`Tx`] client out of the provided [`NonTx`] one.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            shared: Arc::new(Shared {
                origin: RwLock::new(Some(client)),
                tx: RwLock::new(None),
            }),
        }
    }

    /// Returns the transaction of this [`Tx`] client, beginning it if it
    /// didn't begin yet.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        let current = self.shared.tx.read().await;
        if current.is_some() {
            return Ok(RwLockReadGuard::map(current, |tx| {
                tx.as_ref().expect("checked above")
            }));
        }
        drop(current);

        let mut slot = self.shared.tx.write().await;
        if slot.is_none() {
            let origin = self.shared.origin.write().await.take();
            let reused = match origin {
                Some(client) => client.take_connection().await,
                None => None,
            };
            let conn = match reused {
                Some(conn) => conn,
                None => self.pool.get().await.map_err(traced)?,
            };
            *slot = Some(
                connection::Tx::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
            log::trace!("database transaction began");
        }
        Ok(RwLockReadGuard::map(slot.downgrade(), |tx| {
            tx.as_ref().expect("just began")
        }))
    }

    /// Commits the transaction of this [`Tx`] client, if it began.
    ///
    /// Statements run afterwards begin a new transaction.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.shared.tx.write().await.take() else {
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

delegate_to_connection!(Tx);
