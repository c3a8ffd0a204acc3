//! [`Command`] for cancelling an [`Appointment`].

use common::operations::{By, Commit, Lock, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        appointment::{self, Applied, Status, StatusChange},
        slot, Appointment,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling an active [`Appointment`], releasing its slot.
#[derive(Clone, Copy, Debug)]
pub struct CancelAppointment {
    /// ID of the [`Appointment`] to cancel.
    pub appointment_id: appointment::Id,
}

impl<Db, Pay> Command<CancelAppointment> for Service<Db, Pay>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Appointment>, appointment::Id>>,
            Ok = Option<Appointment>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Appointment, slot::Day>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Appointment>, appointment::Id>>,
            Ok = Option<Appointment>,
            Err = Traced<database::Error>,
        > + Database<
            Update<StatusChange>,
            Ok = Applied,
            Err = Traced<database::Error>,
        >
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Appointment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelAppointment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let id = cmd.appointment_id;

        let day = self
            .database()
            .execute(Select(By::<Option<Appointment>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .map(|a| slot::Day {
                lawyer_id: a.lawyer_id,
                date: a.date,
            })
            .ok_or(E::AppointmentNotExists(id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<Appointment, _>::new(day)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut appointment = tx
            .execute(Select(By::<Option<Appointment>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AppointmentNotExists(id))
            .map_err(tracerr::wrap!())?;

        let change = appointment
            .transition(Status::Cancelled)
            .map_err(|e| tracerr::new!(E::from(e)))?
            .ok_or(E::AppointmentCancelled(id))
            .map_err(tracerr::wrap!())?;

        let Applied(applied) = tx
            .execute(Update(change))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !applied {
            return Err(tracerr::new!(E::Conflict(id)));
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(appointment)
    }
}

/// Error of [`CancelAppointment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Appointment`] is cancelled already.
    #[display("`Appointment(id: {_0})` is cancelled already")]
    AppointmentCancelled(#[error(not(source))] appointment::Id),

    /// [`Appointment`] with the provided ID does not exist.
    #[display("`Appointment(id: {_0})` does not exist")]
    AppointmentNotExists(#[error(not(source))] appointment::Id),

    /// [`Appointment`] was changed concurrently.
    #[display("`Appointment(id: {_0})` was changed concurrently")]
    Conflict(#[error(not(source))] appointment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Appointment`] status transition failed.
    #[display("`Appointment` status transition failed: {_0}")]
    #[from]
    Transition(appointment::TransitionError),
}

#[cfg(test)]
mod spec {
    use common::{Date, Time};
    use rust_decimal::Decimal;

    use crate::{
        command::CreateBooking,
        domain::{
            appointment::{self, Duration, Status},
            client,
            lawyer::{self, HourlyRate},
            AvailabilityMap, Lawyer,
        },
        infra::Memory,
        query::ListAvailableSlots,
        spec::service,
        Command as _, Query as _,
    };

    use super::{CancelAppointment, ExecutionError};

    fn monday() -> Date {
        "2099-06-01".parse().unwrap()
    }

    fn ten() -> Time {
        "10:00".parse().unwrap()
    }

    fn lawyer(db: &Memory) -> lawyer::Id {
        let id = lawyer::Id::new();
        db.put_lawyer(Lawyer {
            id,
            hourly_rate: HourlyRate::new(Decimal::from(60_000)).unwrap(),
            availability: AvailabilityMap::default(),
        });
        id
    }

    fn slots(lawyer_id: lawyer::Id) -> ListAvailableSlots {
        ListAvailableSlots {
            lawyer_id,
            date: monday(),
            duration: Duration::HOUR,
        }
    }

    #[tokio::test]
    async fn releases_slot() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        let svc = service(&db);

        let booking = svc
            .execute(CreateBooking {
                lawyer_id,
                client_id: client::Id::new(),
                date: monday(),
                start: ten(),
                duration: Duration::HOUR,
            })
            .await
            .unwrap();
        let before = svc.execute(slots(lawyer_id)).await.unwrap();
        assert!(before.iter().all(|s| s.start != ten()));

        let cancelled = svc
            .execute(CancelAppointment {
                appointment_id: booking.appointment.id,
            })
            .await
            .unwrap();
        assert_eq!(cancelled.status, Status::Cancelled);

        let after = svc.execute(slots(lawyer_id)).await.unwrap();
        assert!(after.iter().any(|s| s.start == ten()));
        assert_eq!(after.len(), before.len() + 1);
    }

    #[tokio::test]
    async fn rejects_cancelled_appointment() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        let svc = service(&db);

        let booking = svc
            .execute(CreateBooking {
                lawyer_id,
                client_id: client::Id::new(),
                date: monday(),
                start: ten(),
                duration: Duration::HOUR,
            })
            .await
            .unwrap();
        let cmd = CancelAppointment {
            appointment_id: booking.appointment.id,
        };
        _ = svc.execute(cmd).await.unwrap();

        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AppointmentCancelled(_),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_appointment() {
        let db = Memory::new();
        let svc = service(&db);

        let err = svc
            .execute(CancelAppointment {
                appointment_id: appointment::Id::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AppointmentNotExists(_),
        ));
    }
}
