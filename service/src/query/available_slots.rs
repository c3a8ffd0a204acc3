//! [`Query`] of the [`Slot`]s a lawyer may be booked at.

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        appointment::Duration,
        lawyer,
        slot::{self, Generator},
        ConflictSet, Lawyer, Slot,
    },
    infra::{database, Database},
    Service,
};

use super::Query;

/// [`Query`] listing the [`Slot`]s of a lawyer's day, which may be booked
/// for the provided [`Duration`].
#[derive(Clone, Copy, Debug)]
pub struct ListAvailableSlots {
    /// ID of the [`Lawyer`] to list the [`Slot`]s of.
    pub lawyer_id: lawyer::Id,

    /// [`Date`] to list the [`Slot`]s on.
    pub date: Date,

    /// Requested [`Duration`] of a consultation.
    pub duration: Duration,
}

impl<Db, Pay> Query<ListAvailableSlots> for Service<Db, Pay>
where
    Db: Database<
            Select<By<Option<Lawyer>, lawyer::Id>>,
            Ok = Option<Lawyer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<ConflictSet, slot::Day>>,
            Ok = ConflictSet,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Slot>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ListAvailableSlots,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ListAvailableSlots {
            lawyer_id,
            date,
            duration,
        } = query;
        let now = self.now();
        let holidays = &self.config().holidays;

        if !slot::is_bookable(date, holidays, now) {
            return Ok(vec![]);
        }

        let lawyer = match self
            .database()
            .execute(Select(By::<Option<Lawyer>, _>::new(lawyer_id)))
            .await
        {
            Ok(Some(lawyer)) => Some(lawyer),
            Ok(None) => {
                return Err(tracerr::new!(E::LawyerNotExists(lawyer_id)));
            }
            Err(e) => {
                log::warn!(
                    "failed to read availability of `Lawyer(id: {lawyer_id})`, \
                     using the default window: {e}",
                );
                None
            }
        };

        let booked = self
            .database()
            .execute(Select(By::<ConflictSet, _>::new(slot::Day {
                lawyer_id,
                date,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Generator {
            availability: lawyer.as_ref().map(|l| &l.availability),
            holidays,
            booked: &booked,
        }
        .available(date, duration, now))
    }
}

/// Error of [`ListAvailableSlots`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Lawyer`] with the provided ID does not exist.
    #[display("`Lawyer(id: {_0})` does not exist")]
    LawyerNotExists(#[error(not(source))] lawyer::Id),
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money, Time};
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::{
        domain::{
            appointment::{self, Duration, Status},
            client,
            lawyer::{self, HourlyRate},
            Appointment, AvailabilityMap, Lawyer,
        },
        infra::{database::memory::Table, Memory},
        spec::service,
        Query as _,
    };

    use super::{ExecutionError, ListAvailableSlots};

    fn starts(slots: &[crate::domain::Slot]) -> Vec<String> {
        slots.iter().map(|s| s.start.to_string()).collect()
    }

    fn lawyer(db: &Memory) -> lawyer::Id {
        let id = lawyer::Id::new();
        db.put_lawyer(Lawyer {
            id,
            hourly_rate: HourlyRate::new(Decimal::from(40_000)).unwrap(),
            availability: AvailabilityMap::from_json(&json!({
                "Lunes": [false, true, true],
            })),
        });
        id
    }

    fn book(db: &Memory, lawyer_id: lawyer::Id, start: &str, status: Status) {
        let now = DateTime::now();
        db.put_appointment(Appointment {
            id: appointment::Id::new(),
            lawyer_id,
            client_id: client::Id::new(),
            date: "2099-06-01".parse().unwrap(),
            start: start.parse::<Time>().unwrap(),
            duration: Duration::HOUR,
            status,
            price: Money::zero(Currency::Clp),
            is_first_consultation: true,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        });
    }

    fn query(lawyer_id: lawyer::Id, date: &str) -> ListAvailableSlots {
        ListAvailableSlots {
            lawyer_id,
            date: date.parse().unwrap(),
            duration: Duration::HOUR,
        }
    }

    #[tokio::test]
    async fn lists_declared_free_slots() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        book(&db, lawyer_id, "10:00", Status::Confirmed);
        book(&db, lawyer_id, "11:00", Status::Cancelled);
        let svc = service(&db);

        let slots = svc.execute(query(lawyer_id, "2099-06-01")).await.unwrap();

        assert_eq!(starts(&slots), ["11:00"]);
        assert_eq!(slots[0].end.to_string(), "12:00");
    }

    #[tokio::test]
    async fn uses_default_window_for_undeclared_day() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        let svc = service(&db);

        // 2099-06-02 is a Tuesday.
        let slots = svc.execute(query(lawyer_id, "2099-06-02")).await.unwrap();

        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0].start.to_string(), "09:00");
        assert_eq!(slots[8].start.to_string(), "17:00");
    }

    #[tokio::test]
    async fn falls_back_to_default_window_on_read_failure() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        db.set_failing(Table::Lawyers, true);
        let svc = service(&db);

        let slots = svc.execute(query(lawyer_id, "2099-06-01")).await.unwrap();

        assert_eq!(slots.len(), 9);
    }

    #[tokio::test]
    async fn is_empty_on_closed_days() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        // Must not even be read.
        db.set_failing(Table::Appointments, true);
        let svc = service(&db);

        for date in [
            // Sunday.
            "2099-06-07",
            // Christmas.
            "2099-12-25",
            // Past.
            "2000-06-05",
        ] {
            let slots = svc.execute(query(lawyer_id, date)).await.unwrap();
            assert!(slots.is_empty(), "{date}");
        }
    }

    #[tokio::test]
    async fn rejects_unknown_lawyer() {
        let db = Memory::new();
        let svc = service(&db);

        let err = svc
            .execute(query(lawyer::Id::new(), "2099-06-01"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::LawyerNotExists(_)));
    }

    #[tokio::test]
    async fn fails_when_bookings_are_unreadable() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        db.set_failing(Table::Appointments, true);
        let svc = service(&db);

        let err = svc
            .execute(query(lawyer_id, "2099-06-01"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
    }
}
