//! [`Connection`] definitions.

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;
use tracing as log;

use crate::infra::database;

use super::traced;

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Parameters bound to a SQL statement.
pub type Params<'p> = [&'p (dyn ToSql + Sync)];

/// Pooled connection holding an open transaction.
///
/// Dropping it without [`commit`] rolls the transaction back.
///
/// [`commit`]: Tx::commit
#[self_referencing]
pub struct Tx {
    /// [`NonTx`] connection the transaction borrows.
    non_tx: NonTx,

    /// Open transaction, taken out on commit.
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance"
        )]
        let committed = self.with_tx(|tx| tx.is_none());
        f.debug_struct("Tx")
            .field("committed", &committed)
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Opens a transaction on the provided [`NonTx`] connection.
    ///
    /// # Errors
    ///
    /// If the `BEGIN` statement fails.
    pub async fn begin(conn: NonTx) -> Result<Self, Traced<database::Error>> {
        Self::try_new_async_send(conn, |c| {
            c.transaction().map_ok(Some).boxed()
        })
        .await
        .map_err(traced)
    }

    /// Returns the open transaction.
    fn open(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("already committed"))
    }

    /// Commits this [`Tx`].
    ///
    /// # Errors
    ///
    /// If the `COMMIT` statement fails, like on a serialization conflict.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        let tx = self
            .with_tx_mut(|tx| tx.take())
            .expect("already committed");
        tx.commit().await.map_err(traced)?;
        log::trace!("database transaction committed");
        Ok(())
    }
}

/// Something SQL statements can be run on: a pooled connection, an open
/// transaction, or a lazily connecting client.
pub trait Connection {
    /// Runs the provided statement returning all the resulting rows.
    ///
    /// # Errors
    ///
    /// If the statement fails.
    fn query<T>(
        &self,
        stmt: &T,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Runs the provided statement returning at most one resulting row.
    ///
    /// # Errors
    ///
    /// If the statement fails or returns more than one row.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Runs the provided statement returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// If the statement fails.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &Params<'_>,
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;
}

/// Implements [`Connection`] for a `$ty` by running statements on the
/// `tokio_postgres` handle the `$conn` expression yields for `$this`.
macro_rules! impl_connection {
    ($ty:ty, |$this:ident| $conn:expr) => {
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &Params<'_>,
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $conn.query(stmt, params).await.map_err(traced)
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &Params<'_>,
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $conn.query_opt(stmt, params).await.map_err(traced)
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &Params<'_>,
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $conn.execute(stmt, params).await.map_err(traced)
            }
        }
    };
}

impl_connection!(NonTx, |c| &**c);
impl_connection!(Tx, |c| c.open());
