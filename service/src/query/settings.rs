//! [`Query`] of the current [`PlatformSettings`].

use std::convert::Infallible;

use crate::{domain::PlatformSettings, Service};

use super::Query;

/// [`Query`] returning the [`PlatformSettings`] currently used for pricing.
///
/// Doesn't touch the [`Database`], returning the last loaded snapshot.
///
/// [`Database`]: crate::infra::Database
#[derive(Clone, Copy, Debug)]
pub struct CurrentSettings;

impl<Db, Pay> Query<CurrentSettings> for Service<Db, Pay> {
    type Ok = PlatformSettings;
    type Err = Infallible;

    async fn execute(&self, _: CurrentSettings) -> Result<Self::Ok, Self::Err> {
        Ok(self.settings())
    }
}
