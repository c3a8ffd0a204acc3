//! [`Query`] of a consultation price.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        appointment::{Duration, FirstConsultation, Parties},
        client, lawyer, pricing, Lawyer, Quote,
    },
    infra::{database, Database},
    Service,
};

use super::Query;

/// [`Query`] pricing a consultation of a client with a [`Lawyer`] using the
/// current [`PlatformSettings`].
///
/// [`PlatformSettings`]: crate::domain::PlatformSettings
#[derive(Clone, Copy, Debug)]
pub struct QuotePrice {
    /// ID of the [`Lawyer`] to consult.
    pub lawyer_id: lawyer::Id,

    /// ID of the consulting client.
    pub client_id: client::Id,

    /// [`Duration`] of the consultation.
    pub duration: Duration,
}

impl<Db, Pay> Query<QuotePrice> for Service<Db, Pay>
where
    Db: Database<
            Select<By<Option<Lawyer>, lawyer::Id>>,
            Ok = Option<Lawyer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<FirstConsultation, Parties>>,
            Ok = FirstConsultation,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Quote;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: QuotePrice) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let QuotePrice {
            lawyer_id,
            client_id,
            duration,
        } = query;

        let lawyer = self
            .database()
            .execute(Select(By::<Option<Lawyer>, _>::new(lawyer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LawyerNotExists(lawyer_id))
            .map_err(tracerr::wrap!())?;

        let FirstConsultation(is_first) = self
            .database()
            .execute(Select(By::<FirstConsultation, _>::new(Parties {
                client_id,
                lawyer_id,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let settings = self.settings();
        Ok(pricing::quote(
            lawyer.hourly_rate,
            duration,
            is_first,
            settings.client_surcharge,
            settings.currency,
        ))
    }
}

/// Error of [`QuotePrice`] [`Query`] execution.
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
    use common::{money::Currency, Money};
    use rust_decimal::Decimal;

    use crate::{
        command::RefreshSettings,
        domain::{
            appointment::Duration,
            client,
            lawyer::{self, HourlyRate},
            AvailabilityMap, Lawyer, PlatformSettings,
        },
        infra::Memory,
        spec::service,
        Command as _, Query as _,
    };

    use super::{ExecutionError, QuotePrice};

    fn money(amount: i64, currency: Currency) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency,
        }
    }

    fn lawyer(db: &Memory) -> lawyer::Id {
        let id = lawyer::Id::new();
        db.put_lawyer(Lawyer {
            id,
            hourly_rate: HourlyRate::new(Decimal::from(90_000)).unwrap(),
            availability: AvailabilityMap::default(),
        });
        id
    }

    #[tokio::test]
    async fn quotes_first_consultation() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        let svc = service(&db);

        let quote = svc
            .execute(QuotePrice {
                lawyer_id,
                client_id: client::Id::new(),
                duration: Duration::new(30).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(quote.base, money(45_000, Currency::Clp));
        assert_eq!(quote.discount, money(18_000, Currency::Clp));
        assert_eq!(quote.total, money(29_700, Currency::Clp));
    }

    #[tokio::test]
    async fn follows_refreshed_settings() {
        let db = Memory::new();
        let lawyer_id = lawyer(&db);
        db.put_settings(PlatformSettings {
            client_surcharge: "20".parse().unwrap(),
            platform_fee: "15".parse().unwrap(),
            currency: Currency::Usd,
        });
        let svc = service(&db);
        _ = svc.execute(RefreshSettings).await.unwrap();

        let quote = svc
            .execute(QuotePrice {
                lawyer_id,
                client_id: client::Id::new(),
                duration: Duration::HOUR,
            })
            .await
            .unwrap();

        assert_eq!(quote.surcharge, money(10_800, Currency::Usd));
        assert_eq!(quote.total, money(64_800, Currency::Usd));
    }

    #[tokio::test]
    async fn rejects_unknown_lawyer() {
        let db = Memory::new();
        let svc = service(&db);

        let err = svc
            .execute(QuotePrice {
                lawyer_id: lawyer::Id::new(),
                client_id: client::Id::new(),
                duration: Duration::HOUR,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::LawyerNotExists(_)));
    }
}
