//! [`ExpirePendingAppointments`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start, Update};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Appointment;
use crate::{
    domain::appointment,
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`ExpirePendingAppointments`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between checks for expired [`Appointment`]s.
    pub interval: time::Duration,

    /// Time an [`Appointment`] may wait for its payment before being
    /// cancelled.
    pub ttl: time::Duration,
}

/// [`Task`] cancelling [`Appointment`]s which have been waiting for their
/// payment for too long, so their slots become free again.
#[derive(Clone, Copy, Debug)]
pub struct ExpirePendingAppointments<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Pay> Task<Start<By<ExpirePendingAppointments<Self>, Config>>>
    for Service<Db, Pay>
where
    ExpirePendingAppointments<Service<Db, Pay>>:
        Task<Perform<()>, Ok = appointment::Expired, Err: Error>,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ExpirePendingAppointments<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ExpirePendingAppointments {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(appointment::Expired(ids)) if !ids.is_empty() => {
                    log::info!("cancelled {} expired appointments", ids.len());
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("`task::ExpirePendingAppointments` failed: {e}");
                }
            }
        }
    }
}

impl<Db, Pay> Task<Perform<()>> for ExpirePendingAppointments<Service<Db, Pay>>
where
    Db: Database<
        Update<By<appointment::Expired, appointment::CreationDateTime>>,
        Ok = appointment::Expired,
        Err = Traced<database::Error>,
    >,
{
    type Ok = appointment::Expired;
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = appointment::CreationDateTime::now() - self.config.ttl;
        self.service
            .database()
            .execute(Update(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`ExpirePendingAppointments`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        money::Currency, operations::Perform, Date, DateTime, Money, Time,
    };

    use crate::{
        domain::{
            appointment::{self, Status},
            client, lawyer, Appointment,
        },
        infra::Memory,
        spec::service,
        Task as _,
    };

    use super::{Config, ExpirePendingAppointments};

    fn pending(created_ago: Duration, start: &str) -> Appointment {
        let created_at = DateTime::now() - created_ago;
        Appointment {
            id: appointment::Id::new(),
            lawyer_id: lawyer::Id::new(),
            client_id: client::Id::new(),
            date: "2099-06-01".parse::<Date>().unwrap(),
            start: start.parse::<Time>().unwrap(),
            duration: appointment::Duration::HOUR,
            status: Status::PendingPayment,
            price: Money::zero(Currency::Clp),
            is_first_consultation: false,
            created_at: created_at.coerce(),
            updated_at: created_at.coerce(),
        }
    }

    #[tokio::test]
    async fn cancels_only_stale_pending_appointments() {
        let db = Memory::new();
        let stale = pending(Duration::from_secs(31 * 60), "09:00");
        let fresh = pending(Duration::from_secs(5 * 60), "10:00");
        let mut paid = pending(Duration::from_secs(60 * 60), "11:00");
        paid.status = Status::Confirmed;
        for a in [&stale, &fresh, &paid] {
            db.put_appointment(a.clone());
        }

        let task = ExpirePendingAppointments {
            config: Config {
                interval: Duration::from_secs(60),
                ttl: Duration::from_secs(30 * 60),
            },
            service: service(&db),
        };
        let expired = task.execute(Perform(())).await.unwrap();

        assert_eq!(expired.0, vec![stale.id]);
        let statuses = db
            .appointments()
            .into_iter()
            .map(|a| (a.id, a.status))
            .collect::<Vec<_>>();
        assert_eq!(
            statuses,
            [
                (stale.id, Status::Cancelled),
                (fresh.id, Status::PendingPayment),
                (paid.id, Status::Confirmed),
            ],
        );

        let expired = task.execute(Perform(())).await.unwrap();
        assert!(expired.0.is_empty());
    }
}
