//! [`Command`] for settling the payment of an [`Appointment`].

use common::operations::{By, Commit, Lock, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        appointment::{self, Applied, Status, StatusChange},
        slot, Appointment,
    },
    infra::{database, payment::Outcome, Database},
    Service,
};

use super::Command;

/// [`Command`] for settling the payment of an [`Appointment`] once the
/// payment [`Gateway`] reports its [`Outcome`].
///
/// Repeated reports of the same [`Outcome`] are no-ops.
///
/// [`Gateway`]: crate::infra::Gateway
#[derive(Clone, Copy, Debug)]
pub struct SettlePayment {
    /// ID of the paid [`Appointment`].
    pub appointment_id: appointment::Id,

    /// Reported [`Outcome`] of the payment.
    pub outcome: Outcome,
}

impl<Db, Pay> Command<SettlePayment> for Service<Db, Pay>
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

    async fn execute(&self, cmd: SettlePayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SettlePayment {
            appointment_id,
            outcome,
        } = cmd;

        let appointment = self
            .database()
            .execute(Select(By::<Option<Appointment>, _>::new(appointment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AppointmentNotExists(appointment_id))
            .map_err(tracerr::wrap!())?;

        let target = match outcome {
            Outcome::Succeeded => Status::Confirmed,
            Outcome::Failed => Status::Cancelled,
            Outcome::Pending => return Ok(appointment),
        };
        if appointment.status == target {
            return Ok(appointment);
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent changes of the same day.
        tx.execute(Lock(By::<Appointment, _>::new(slot::Day {
            lawyer_id: appointment.lawyer_id,
            date: appointment.date,
        })))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        let mut appointment = tx
            .execute(Select(By::<Option<Appointment>, _>::new(appointment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AppointmentNotExists(appointment_id))
            .map_err(tracerr::wrap!())?;

        match (appointment.status, target) {
            (Status::Cancelled, Status::Confirmed) => {
                log::warn!(
                    "payment succeeded for cancelled \
                     `Appointment(id: {appointment_id})`",
                );
                return Err(tracerr::new!(E::AppointmentCancelled(
                    appointment_id
                )));
            }
            (Status::Confirmed, Status::Cancelled) => {
                return Err(tracerr::new!(E::AppointmentConfirmed(
                    appointment_id
                )));
            }
            _ => {}
        }

        let change = appointment
            .transition(target)
            .map_err(|e| tracerr::new!(E::from(e)))?;
        if let Some(change) = change {
            let Applied(applied) = tx
                .execute(Update(change))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !applied {
                return Err(tracerr::new!(E::Conflict(appointment_id)));
            }
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        Ok(appointment)
    }
}

/// Error of [`SettlePayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Appointment`] was cancelled before the payment succeeded.
    #[display("`Appointment(id: {_0})` is cancelled")]
    AppointmentCancelled(#[error(not(source))] appointment::Id),

    /// [`Appointment`] is already paid.
    #[display("`Appointment(id: {_0})` is already confirmed")]
    AppointmentConfirmed(#[error(not(source))] appointment::Id),

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
    use common::{money::Currency, DateTime, Money};

    use crate::{
        domain::{
            appointment::{self, Duration, Status},
            client, lawyer, Appointment,
        },
        infra::{payment::Outcome, Memory},
        spec::service,
        Command as _,
    };

    use super::{ExecutionError, SettlePayment};

    fn stored(db: &Memory, status: Status) -> appointment::Id {
        let now = DateTime::now();
        let id = appointment::Id::new();
        db.put_appointment(Appointment {
            id,
            lawyer_id: lawyer::Id::new(),
            client_id: client::Id::new(),
            date: "2099-06-01".parse().unwrap(),
            start: "10:00".parse().unwrap(),
            duration: Duration::HOUR,
            status,
            price: Money::zero(Currency::Clp),
            is_first_consultation: true,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        });
        id
    }

    fn settle(
        appointment_id: appointment::Id,
        outcome: Outcome,
    ) -> SettlePayment {
        SettlePayment {
            appointment_id,
            outcome,
        }
    }

    #[tokio::test]
    async fn confirms_on_success_idempotently() {
        let db = Memory::new();
        let id = stored(&db, Status::PendingPayment);
        let svc = service(&db);

        let a = svc.execute(settle(id, Outcome::Succeeded)).await.unwrap();
        assert_eq!(a.status, Status::Confirmed);

        let a = svc.execute(settle(id, Outcome::Succeeded)).await.unwrap();
        assert_eq!(a.status, Status::Confirmed);
        assert_eq!(db.appointments()[0].status, Status::Confirmed);
    }

    #[tokio::test]
    async fn cancels_on_failure() {
        let db = Memory::new();
        let id = stored(&db, Status::PendingPayment);
        let svc = service(&db);

        let a = svc.execute(settle(id, Outcome::Failed)).await.unwrap();
        assert_eq!(a.status, Status::Cancelled);
        assert_eq!(db.appointments()[0].status, Status::Cancelled);

        let a = svc.execute(settle(id, Outcome::Failed)).await.unwrap();
        assert_eq!(a.status, Status::Cancelled);
    }

    #[tokio::test]
    async fn keeps_status_while_pending() {
        let db = Memory::new();
        let id = stored(&db, Status::PendingPayment);
        let svc = service(&db);

        let a = svc.execute(settle(id, Outcome::Pending)).await.unwrap();
        assert_eq!(a.status, Status::PendingPayment);
    }

    #[tokio::test]
    async fn rejects_late_outcomes() {
        let db = Memory::new();
        let cancelled = stored(&db, Status::Cancelled);
        let confirmed = stored(&db, Status::Confirmed);
        let svc = service(&db);

        let err = svc
            .execute(settle(cancelled, Outcome::Succeeded))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AppointmentCancelled(_),
        ));

        let err = svc
            .execute(settle(confirmed, Outcome::Failed))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AppointmentConfirmed(_),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_appointment() {
        let db = Memory::new();
        let svc = service(&db);

        let err = svc
            .execute(settle(appointment::Id::new(), Outcome::Succeeded))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AppointmentNotExists(_),
        ));
    }
}
