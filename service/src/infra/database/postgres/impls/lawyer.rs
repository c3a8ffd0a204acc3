//! [`Lawyer`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{lawyer, AvailabilityMap, Lawyer},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Lawyer>, lawyer::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Lawyer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Lawyer>, lawyer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: lawyer::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, hourly_rate, availability \
            FROM lawyers \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Lawyer {
                id: row.get("id"),
                hourly_rate: row.get("hourly_rate"),
                availability: row
                    .get::<_, Option<serde_json::Value>>("availability")
                    .as_ref()
                    .map(AvailabilityMap::from_json)
                    .unwrap_or_default(),
            }))
    }
}
