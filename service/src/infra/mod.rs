//! Infrastructure layer.

pub mod database;
pub mod payment;

pub use self::{database::Database, payment::Gateway};
#[cfg(any(test, feature = "memory"))]
pub use self::database::Memory;
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
