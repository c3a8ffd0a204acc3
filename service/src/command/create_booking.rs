//! [`Command`] for booking a consultation.

use common::{
    operations::{
        By, Commit, Insert, Lock, Perform, Select, Transact, Transacted, Update,
    },
    Date, DateTime, Time, WallClock,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        appointment::{
            self, Applied, Duration, FirstConsultation, Parties, StatusChange,
        },
        client, lawyer, pricing,
        slot::{self, Generator},
        Appointment, ConflictSet, Lawyer, Quote,
    },
    infra::{
        database,
        payment::{self, Checkout, RedirectUrl},
        Database, Gateway,
    },
    Service,
};

use super::Command;

/// [`Command`] for booking a consultation.
///
/// Creates a new [`Appointment`] waiting for the payment and starts its
/// [`Checkout`].
#[derive(Clone, Copy, Debug)]
pub struct CreateBooking {
    /// ID of the [`Lawyer`] to book a consultation with.
    pub lawyer_id: lawyer::Id,

    /// ID of the client booking the consultation.
    pub client_id: client::Id,

    /// [`Date`] of the consultation.
    pub date: Date,

    /// [`Time`] the consultation starts at.
    pub start: Time,

    /// [`Duration`] of the consultation.
    pub duration: Duration,
}

/// Result of a [`CreateBooking`] [`Command`].
#[derive(Clone, Debug)]
pub struct Booking {
    /// Created [`Appointment`] waiting for the payment.
    pub appointment: Appointment,

    /// [`Quote`] the [`Appointment`] is priced with.
    pub quote: Quote,

    /// URL to complete the payment at.
    pub checkout: RedirectUrl,
}

impl<Db, Pay> Command<CreateBooking> for Service<Db, Pay>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Lawyer>, lawyer::Id>>,
            Ok = Option<Lawyer>,
            Err = Traced<database::Error>,
        > + Database<
            Update<StatusChange>,
            Ok = Applied,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Appointment, slot::Day>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<ConflictSet, slot::Day>>,
            Ok = ConflictSet,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<FirstConsultation, Parties>>,
            Ok = FirstConsultation,
            Err = Traced<database::Error>,
        > + Database<Insert<Appointment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Pay: Gateway<
        Perform<Checkout>,
        Ok = RedirectUrl,
        Err = Traced<payment::Error>,
    >,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: CreateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            lawyer_id,
            client_id,
            date,
            start,
            duration,
        } = cmd;
        let day = slot::Day { lawyer_id, date };
        let at = WallClock { date, time: start };
        let now = self.now();

        let lawyer = self
            .database()
            .execute(Select(By::<Option<Lawyer>, _>::new(lawyer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LawyerNotExists(lawyer_id))
            .map_err(tracerr::wrap!())?;

        if !slot::is_bookable(date, &self.config().holidays, now) {
            return Err(tracerr::new!(E::SlotUnavailable(at)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent bookings of the same day.
        tx.execute(Lock(By::<Appointment, _>::new(day)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let booked = tx
            .execute(Select(By::<ConflictSet, _>::new(day)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let is_open = Generator {
            availability: Some(&lawyer.availability),
            holidays: &self.config().holidays,
            booked: &booked,
        }
        .available(date, duration, now)
        .iter()
        .any(|s| s.start == start);
        if !is_open {
            return Err(tracerr::new!(E::SlotUnavailable(at)));
        }

        let FirstConsultation(is_first_consultation) = tx
            .execute(Select(By::<FirstConsultation, _>::new(Parties {
                client_id,
                lawyer_id,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let settings = self.settings();
        let quote = pricing::quote(
            lawyer.hourly_rate,
            duration,
            is_first_consultation,
            settings.client_surcharge,
            settings.currency,
        );

        let now = DateTime::now();
        let mut appointment = Appointment {
            id: appointment::Id::new(),
            lawyer_id,
            client_id,
            date,
            start,
            duration,
            status: appointment::Status::PendingPayment,
            price: quote.total,
            is_first_consultation,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        match tx.execute(Insert(appointment.clone())).await {
            Ok(_) => {}
            Err(e) if e.as_ref().is_slot_taken() => {
                return Err(tracerr::new!(E::SlotTaken(at)));
            }
            Err(e) => return Err((tracerr::map_from_and_wrap!(=> E))(e)),
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let checkout = match self
            .payment()
            .execute(Perform(Checkout {
                appointment_id: appointment.id,
                amount: quote.total,
            }))
            .await
        {
            Ok(url) => url,
            Err(e) => {
                log::warn!(
                    "`Checkout` of `Appointment(id: {})` failed, \
                     cancelling it: {e}",
                    appointment.id,
                );
                let change = appointment
                    .transition(appointment::Status::Cancelled)
                    .map_err(|e| tracerr::new!(E::from(e)))?;
                if let Some(change) = change {
                    let Applied(applied) = self
                        .database()
                        .execute(Update(change))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?;
                    if !applied {
                        log::warn!(
                            "`Appointment(id: {})` changed before being \
                             cancelled",
                            appointment.id,
                        );
                    }
                }
                return Err((tracerr::map_from_and_wrap!(=> E))(e));
            }
        };

        Ok(Booking {
            appointment,
            quote,
            checkout,
        })
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Lawyer`] with the provided ID does not exist.
    #[display("`Lawyer(id: {_0})` does not exist")]
    LawyerNotExists(#[error(not(source))] lawyer::Id),

    /// Payment [`Gateway`] failed to start a [`Checkout`].
    #[display("Payment `Gateway` failed: {_0}")]
    #[from]
    Payment(payment::Error),

    /// Requested slot is not offered.
    #[display("Slot at `{_0}` is unavailable")]
    SlotUnavailable(#[error(not(source))] WallClock),

    /// Requested slot was taken by a concurrent booking.
    #[display("Slot at `{_0}` is already taken")]
    SlotTaken(#[error(not(source))] WallClock),

    /// [`Appointment`] status transition failed.
    #[display("`Appointment` status transition failed: {_0}")]
    #[from]
    Transition(appointment::TransitionError),
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, Money, Time};
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::{
        domain::{
            appointment::{Duration, Status},
            client,
            lawyer::{self, HourlyRate},
            AvailabilityMap, Lawyer,
        },
        infra::{database::memory::Table, Memory},
        query::ListAvailableSlots,
        spec::{config, service, Refusing},
        Command as _, Service,
    };

    use super::{CreateBooking, ExecutionError};

    // 2099-06-01 is a Monday.
    fn monday() -> Date {
        "2099-06-01".parse().unwrap()
    }

    fn time(s: &str) -> Time {
        s.parse().unwrap()
    }

    fn clp(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Clp,
        }
    }

    fn lawyer(db: &Memory, rate: i64) -> lawyer::Id {
        let id = lawyer::Id::new();
        db.put_lawyer(Lawyer {
            id,
            hourly_rate: HourlyRate::new(Decimal::from(rate)).unwrap(),
            availability: AvailabilityMap::from_json(&json!({
                "lunes": [true, true, true],
            })),
        });
        id
    }

    fn booking(
        lawyer_id: lawyer::Id,
        client_id: client::Id,
        start: &str,
    ) -> CreateBooking {
        CreateBooking {
            lawyer_id,
            client_id,
            date: monday(),
            start: time(start),
            duration: Duration::HOUR,
        }
    }

    #[tokio::test]
    async fn creates_pending_appointment() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db, 100_000);
        let client_id = client::Id::new();
        let svc = service(&db);

        let booking = svc
            .execute(booking(lawyer_id, client_id, "10:00"))
            .await
            .unwrap();

        assert_eq!(booking.appointment.status, Status::PendingPayment);
        assert!(booking.appointment.is_first_consultation);
        assert_eq!(booking.appointment.price, clp(66_000));
        assert_eq!(booking.quote.discount, clp(40_000));
        assert_eq!(
            booking.checkout.to_string(),
            format!(
                "https://pay.example.com?appointment={}\
                 &amount=66000&currency=CLP",
                booking.appointment.id,
            ),
        );
        assert_eq!(db.appointments().len(), 1);
    }

    #[tokio::test]
    async fn discounts_only_first_consultation() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db, 100_000);
        let client_id = client::Id::new();
        let svc = service(&db);

        _ = svc
            .execute(booking(lawyer_id, client_id, "09:00"))
            .await
            .unwrap();
        let second = svc
            .execute(booking(lawyer_id, client_id, "10:00"))
            .await
            .unwrap();

        assert!(!second.appointment.is_first_consultation);
        assert_eq!(second.appointment.price, clp(110_000));

        let other = svc
            .execute(booking(lawyer_id, client::Id::new(), "11:00"))
            .await
            .unwrap();
        assert!(other.appointment.is_first_consultation);
    }

    #[tokio::test]
    async fn rejects_booked_slot() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db, 50_000);
        let svc = service(&db);

        _ = svc
            .execute(booking(lawyer_id, client::Id::new(), "10:00"))
            .await
            .unwrap();
        let err = svc
            .execute(booking(lawyer_id, client::Id::new(), "10:00"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::SlotUnavailable(_),
        ));
        assert_eq!(db.appointments().len(), 1);
    }

    #[tokio::test]
    async fn rejects_slot_not_offered() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db, 50_000);
        let svc = service(&db);

        for (date, start) in [
            // Outside declared blocks.
            ("2099-06-01", "15:00"),
            // Not on a block boundary.
            ("2099-06-01", "09:30"),
            // Sunday.
            ("2099-06-07", "10:00"),
            // Past.
            ("2000-06-05", "10:00"),
        ] {
            let err = svc
                .execute(CreateBooking {
                    date: date.parse().unwrap(),
                    ..booking(lawyer_id, client::Id::new(), start)
                })
                .await
                .unwrap_err();

            assert!(
                matches!(err.as_ref(), ExecutionError::SlotUnavailable(_)),
                "{date} {start}: {err}",
            );
        }
        assert!(db.appointments().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_lawyer() {
        let db = Memory::new();
        let svc = service(&db);

        let err = svc
            .execute(booking(lawyer::Id::new(), client::Id::new(), "10:00"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::LawyerNotExists(_)));
    }

    #[tokio::test]
    async fn fails_loudly_when_database_is_unavailable() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db, 50_000);
        let svc = service(&db);
        db.set_failing(Table::Appointments, true);

        let err = svc
            .execute(booking(lawyer_id, client::Id::new(), "10:00"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
    }

    #[tokio::test]
    async fn cancels_appointment_when_checkout_fails() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db, 50_000);
        let svc = Service::without_tasks(config(), db.clone(), Refusing);

        let err = svc
            .execute(booking(lawyer_id, client::Id::new(), "10:00"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Payment(_)));
        let appointments = db.appointments();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].status, Status::Cancelled);

        // The slot is free again.
        let svc = service(&db);
        let booking = svc
            .execute(booking(lawyer_id, client::Id::new(), "10:00"))
            .await
            .unwrap();
        assert_eq!(booking.appointment.status, Status::PendingPayment);
    }

    #[tokio::test]
    async fn books_every_listed_slot() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db, 50_000);
        let svc = service(&db);

        // Declared blocks on Monday, default window on Tuesday.
        for date in ["2099-06-01", "2099-06-02"] {
            let date = date.parse::<Date>().unwrap();
            let list = ListAvailableSlots {
                lawyer_id,
                date,
                duration: Duration::HOUR,
            };

            let slots = svc.execute(list).await.unwrap();
            assert!(!slots.is_empty(), "{date}");

            for slot in slots {
                let booking = svc
                    .execute(CreateBooking {
                        date,
                        start: slot.start,
                        ..booking(lawyer_id, client::Id::new(), "09:00")
                    })
                    .await
                    .unwrap_or_else(|e| panic!("{date} {}: {e}", slot.start));
                assert_eq!(booking.appointment.start, slot.start);
            }

            assert!(svc.execute(list).await.unwrap().is_empty(), "{date}");
        }
    }
}
