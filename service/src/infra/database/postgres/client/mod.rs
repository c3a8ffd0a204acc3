//! Postgres database clients lazily checking a [`Connection`] out of the
//! [`connection::Pool`].
//!
//! [`Connection`]: super::Connection

pub mod non_tx;
pub mod tx;

#[cfg(doc)]
use super::connection;

pub use self::{non_tx::NonTx, tx::Tx};

/// Implements [`Connection`] for a client by running every statement on
/// the [`Connection`] its `connection()` method checks out.
///
/// Expects [`Connection`], [`Params`], [`Row`], [`ToStatement`], [`Traced`]
/// and `database` to be in scope.
///
/// [`Connection`]: super::Connection
/// [`Params`]: super::connection::Params
/// [`Row`]: tokio_postgres::Row
/// [`ToStatement`]: tokio_postgres::ToStatement
/// [`Traced`]: tracerr::Traced
macro_rules! delegate_to_connection {
    ($client:ty) => {
        impl Connection for $client {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &Params<'_>,
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &Params<'_>,
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &Params<'_>,
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    };
}
use delegate_to_connection;
