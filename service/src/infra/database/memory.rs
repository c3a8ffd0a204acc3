//! In-memory [`Database`] implementation.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Update};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{
        appointment::{self, Applied, FirstConsultation, Parties, StatusChange},
        lawyer, slot, Appointment, ConflictSet, Lawyer, PlatformSettings,
    },
    infra::{database, Database},
};

/// In-memory [`Database`] storing everything in the process memory.
///
/// Transactions are not isolated: [`Lock`]s are no-ops and every operation
/// is applied immediately. Inserting an [`Appointment`] atomically checks
/// its slot is not occupied yet.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Inner>);

/// Inner state of the [`Memory`] database.
#[derive(Debug, Default)]
struct Inner {
    /// Stored [`Lawyer`]s.
    lawyers: Mutex<HashMap<lawyer::Id, Lawyer>>,

    /// Stored [`Appointment`]s in their insertion order.
    appointments: Mutex<Vec<Appointment>>,

    /// Stored [`PlatformSettings`].
    settings: Mutex<Option<PlatformSettings>>,

    /// [`Table`]s whose operations currently fail.
    failing: Mutex<HashSet<Table>>,
}

/// Storage area of the [`Memory`] database.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Table {
    /// [`Lawyer`]s.
    Lawyers,

    /// [`Appointment`]s.
    Appointments,

    /// [`PlatformSettings`].
    Settings,
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Slot of the inserted [`Appointment`] is already occupied.
    #[display("appointment slot is already occupied")]
    UniqueViolation,

    /// [`Table`] is made unavailable.
    #[display("`{_0}` table is unavailable")]
    Unavailable(#[error(not(source))] Table),
}

/// Locks the provided [`Mutex`] ignoring its poisoning.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the provided [`Lawyer`], replacing the existing one.
    pub fn put_lawyer(&self, lawyer: Lawyer) {
        _ = lock(&self.0.lawyers).insert(lawyer.id, lawyer);
    }

    /// Stores the provided [`PlatformSettings`].
    pub fn put_settings(&self, settings: PlatformSettings) {
        _ = lock(&self.0.settings).replace(settings);
    }

    /// Stores the provided [`Appointment`] as is, without checking its slot.
    pub fn put_appointment(&self, appointment: Appointment) {
        let mut appointments = lock(&self.0.appointments);
        if let Some(stored) =
            appointments.iter_mut().find(|a| a.id == appointment.id)
        {
            *stored = appointment;
        } else {
            appointments.push(appointment);
        }
    }

    /// Returns all the stored [`Appointment`]s in their insertion order.
    #[must_use]
    pub fn appointments(&self) -> Vec<Appointment> {
        lock(&self.0.appointments).clone()
    }

    /// Makes operations upon the provided [`Table`] fail (or succeed again).
    pub fn set_failing(&self, table: Table, failing: bool) {
        let mut tables = lock(&self.0.failing);
        if failing {
            _ = tables.insert(table);
        } else {
            _ = tables.remove(&table);
        }
    }

    /// Checks whether the provided [`Table`] is operational.
    fn check(&self, table: Table) -> Result<(), Traced<database::Error>> {
        if lock(&self.0.failing).contains(&table) {
            return Err(tracerr::new!(database::Error::from(
                Error::Unavailable(table)
            )));
        }
        Ok(())
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Appointment, slot::Day>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Appointment, slot::Day>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Table::Appointments)
    }
}

impl Database<Select<By<Option<Lawyer>, lawyer::Id>>> for Memory {
    type Ok = Option<Lawyer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Lawyer>, lawyer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Table::Lawyers)?;
        Ok(lock(&self.0.lawyers).get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<ConflictSet, slot::Day>>> for Memory {
    type Ok = ConflictSet;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<ConflictSet, slot::Day>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slot::Day { lawyer_id, date } = by.into_inner();

        self.check(Table::Appointments)?;
        Ok(lock(&self.0.appointments)
            .iter()
            .filter(|a| a.lawyer_id == lawyer_id && a.date == date)
            .filter(|a| a.is_active())
            .map(|a| a.start)
            .collect())
    }
}

impl Database<Select<By<FirstConsultation, Parties>>> for Memory {
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

        self.check(Table::Appointments)?;
        Ok(FirstConsultation(!lock(&self.0.appointments).iter().any(|a| {
            a.client_id == client_id && a.lawyer_id == lawyer_id && a.is_active()
        })))
    }
}

impl Database<Select<By<Option<Appointment>, appointment::Id>>> for Memory {
    type Ok = Option<Appointment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Appointment>, appointment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        self.check(Table::Appointments)?;
        Ok(lock(&self.0.appointments)
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }
}

impl Database<Select<By<Option<PlatformSettings>, ()>>> for Memory {
    type Ok = Option<PlatformSettings>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<PlatformSettings>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Table::Settings)?;
        Ok(*lock(&self.0.settings))
    }
}

impl Database<Insert<Appointment>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(appointment): Insert<Appointment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check(Table::Appointments)?;

        let mut appointments = lock(&self.0.appointments);
        let occupied = appointments.iter().any(|a| {
            a.id == appointment.id
                || (appointment.is_active()
                    && a.is_active()
                    && a.lawyer_id == appointment.lawyer_id
                    && a.date == appointment.date
                    && a.start == appointment.start)
        });
        if occupied {
            return Err(tracerr::new!(database::Error::from(
                Error::UniqueViolation
            )));
        }
        appointments.push(appointment);
        Ok(())
    }
}

impl Database<Update<StatusChange>> for Memory {
    type Ok = Applied;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(change): Update<StatusChange>,
    ) -> Result<Self::Ok, Self::Err> {
        let StatusChange { id, from, to, at } = change;

        self.check(Table::Appointments)?;
        let mut appointments = lock(&self.0.appointments);
        let Some(stored) = appointments
            .iter_mut()
            .find(|a| a.id == id && a.status == from)
        else {
            return Ok(Applied(false));
        };
        stored.status = to;
        stored.updated_at = at;
        Ok(Applied(true))
    }
}

impl Database<Update<By<appointment::Expired, appointment::CreationDateTime>>>
    for Memory
{
    type Ok = appointment::Expired;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(by): Update<
            By<appointment::Expired, appointment::CreationDateTime>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline = by.into_inner();

        self.check(Table::Appointments)?;
        let mut expired = vec![];
        for a in lock(&self.0.appointments).iter_mut() {
            if a.status == appointment::Status::PendingPayment
                && a.created_at < deadline
            {
                a.status = appointment::Status::Cancelled;
                a.updated_at = common::DateTime::now().coerce();
                expired.push(a.id);
            }
        }
        Ok(appointment::Expired(expired))
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration as StdDuration;

    use common::{
        money::Currency,
        operations::{By, Update},
        DateTime, Money,
    };

    use crate::{
        domain::{
            appointment::{self, Applied, Duration, Status, StatusChange},
            client, lawyer, Appointment,
        },
        infra::Database as _,
    };

    use super::Memory;

    fn pending(db: &Memory, created_ago: StdDuration) -> Appointment {
        let created_at = DateTime::now() - created_ago;
        let appointment = Appointment {
            id: appointment::Id::new(),
            lawyer_id: lawyer::Id::new(),
            client_id: client::Id::new(),
            date: "2099-06-01".parse().unwrap(),
            start: "10:00".parse().unwrap(),
            duration: Duration::HOUR,
            status: Status::PendingPayment,
            price: Money::zero(Currency::Clp),
            is_first_consultation: true,
            created_at: created_at.coerce(),
            updated_at: created_at.coerce(),
        };
        db.put_appointment(appointment.clone());
        appointment
    }

    #[tokio::test]
    async fn applies_status_change_from_expected_status() {
        let db = Memory::new();
        let mut appointment = pending(&db, StdDuration::ZERO);

        let change = appointment
            .transition(Status::Confirmed)
            .unwrap()
            .unwrap();
        let applied = db.execute(Update(change)).await.unwrap();

        assert_eq!(applied, Applied(true));
        assert_eq!(db.appointments()[0].status, Status::Confirmed);
        assert_eq!(db.appointments()[0].updated_at, change.at);
    }

    #[tokio::test]
    async fn keeps_expired_appointment_cancelled() {
        let db = Memory::new();
        let mut read = pending(&db, StdDuration::from_secs(3600));

        let deadline: appointment::CreationDateTime =
            (DateTime::now() - StdDuration::from_secs(60)).coerce();
        let expired = db
            .execute(Update(By::<appointment::Expired, _>::new(deadline)))
            .await
            .unwrap();
        assert_eq!(expired, appointment::Expired(vec![read.id]));

        // Change computed from the state read before the expiry.
        let stale: StatusChange =
            read.transition(Status::Confirmed).unwrap().unwrap();
        let applied = db.execute(Update(stale)).await.unwrap();

        assert_eq!(applied, Applied(false));
        assert_eq!(db.appointments()[0].status, Status::Cancelled);
    }
}
