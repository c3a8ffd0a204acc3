//! [`Appointment`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        appointment::{
            self, Applied, Duration, Expired, FirstConsultation, Parties,
            StatusChange,
        },
        slot, Appointment, ConflictSet,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `appointments` table in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, lawyer_id, client_id, \
    date, start_time, duration_minutes, \
    status, price, price_currency, is_first_consultation, \
    created_at, updated_at";

/// Reads an [`Appointment`] from the provided [`Row`].
fn from_row(row: &Row) -> Appointment {
    Appointment {
        id: row.get("id"),
        lawyer_id: row.get("lawyer_id"),
        client_id: row.get("client_id"),
        date: row.get("date"),
        start: row.get("start_time"),
        duration: Duration::try_from(i32::from(
            row.get::<_, i16>("duration_minutes"),
        ))
        .expect("invalid `duration_minutes`"),
        status: row.get("status"),
        price: Money {
            amount: row.get("price"),
            currency: row.get("price_currency"),
        },
        is_first_consultation: row.get("is_first_consultation"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Appointment>, appointment::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Appointment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Appointment>, appointment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: appointment::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM appointments \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<ConflictSet, slot::Day>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ConflictSet;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<ConflictSet, slot::Day>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slot::Day { lawyer_id, date } = by.into_inner();

        const SQL: &str = "\
            SELECT start_time \
            FROM appointments \
            WHERE lawyer_id = $1::UUID \
              AND date = $2::DATE \
              AND status <> $3::INT2";
        Ok(self
            .query(SQL, &[&lawyer_id, &date, &appointment::Status::Cancelled])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("start_time"))
            .collect())
    }
}

impl<C> Database<Select<By<FirstConsultation, Parties>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = FirstConsultation;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<FirstConsultation, Parties>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Parties {
            client_id,
            lawyer_id,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM appointments \
            WHERE client_id = $1::UUID \
              AND lawyer_id = $2::UUID \
              AND status <> $3::INT2 \
            LIMIT 1";
        self.query_opt(
            SQL,
            &[&client_id, &lawyer_id, &appointment::Status::Cancelled],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|r| FirstConsultation(r.is_none()))
    }
}

impl<C> Database<Insert<Appointment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(appointment): Insert<Appointment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Appointment {
            id,
            lawyer_id,
            client_id,
            date,
            start,
            duration,
            status,
            price,
            is_first_consultation,
            created_at,
            updated_at,
        } = appointment;

        let duration = i16::try_from(duration.minutes())
            .expect("`duration_minutes` overflow");

        // Occupying an already taken slot violates the
        // `appointments_active_slot_key` unique index.
        let sql = format!(
            "INSERT INTO appointments ({COLUMNS}) \
             VALUES (\
                 $1::UUID, $2::UUID, $3::UUID, \
                 $4::DATE, $5::TIME, $6::INT2, \
                 $7::INT2, $8::NUMERIC, $9::INT2, $10::BOOL, \
                 $11::TIMESTAMPTZ, $12::TIMESTAMPTZ\
             )",
        );
        self.exec(
            sql.as_str(),
            &[
                &id,
                &lawyer_id,
                &client_id,
                &date,
                &start,
                &duration,
                &status,
                &price.amount,
                &price.currency,
                &is_first_consultation,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<StatusChange>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Applied;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<StatusChange>,
    ) -> Result<Self::Ok, Self::Err> {
        let StatusChange { id, from, to, at } = change;

        const SQL: &str = "\
            UPDATE appointments \
            SET status = $3::INT2, \
                updated_at = $4::TIMESTAMPTZ \
            WHERE id = $1::UUID \
              AND status = $2::INT2";
        self.exec(SQL, &[&id, &from, &to, &at])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| Applied(rows > 0))
    }
}

impl<C> Database<Update<By<Expired, appointment::CreationDateTime>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Expired;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<By<Expired, appointment::CreationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let deadline: appointment::CreationDateTime = by.into_inner();

        const SQL: &str = "\
            UPDATE appointments \
            SET status = $1::INT2, \
                updated_at = NOW() \
            WHERE status = $2::INT2 \
              AND created_at < $3::TIMESTAMPTZ \
            RETURNING id";
        Ok(Expired(
            self.query(
                SQL,
                &[
                    &appointment::Status::Cancelled,
                    &appointment::Status::PendingPayment,
                    &deadline,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect(),
        ))
    }
}

impl<C> Database<Lock<By<Appointment, slot::Day>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Appointment, slot::Day>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slot::Day { lawyer_id, date } = by.into_inner();

        // Touching the row keeps it locked until the transaction ends.
        const SQL: &str = "\
            INSERT INTO appointments_lock (lawyer_id, date) \
            VALUES ($1::UUID, $2::DATE) \
            ON CONFLICT (lawyer_id, date) DO UPDATE \
            SET lawyer_id = EXCLUDED.lawyer_id";
        self.exec(SQL, &[&lawyer_id, &date])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
