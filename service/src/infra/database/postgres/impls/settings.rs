//! [`PlatformSettings`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::PlatformSettings,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<PlatformSettings>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<PlatformSettings>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<PlatformSettings>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT client_surcharge, platform_fee, currency \
            FROM platform_settings \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| PlatformSettings {
                client_surcharge: row.get("client_surcharge"),
                platform_fee: row.get("platform_fee"),
                currency: row.get("currency"),
            }))
    }
}
