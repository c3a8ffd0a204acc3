//! [`Command`] for reloading the [`PlatformSettings`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::PlatformSettings,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for reloading the [`PlatformSettings`] from the [`Database`].
///
/// If no [`PlatformSettings`] are stored, the last known ones are kept.
#[derive(Clone, Copy, Debug)]
pub struct RefreshSettings;

impl<Db, Pay> Command<RefreshSettings> for Service<Db, Pay>
where
    Db: Database<
        Select<By<Option<PlatformSettings>, ()>>,
        Ok = Option<PlatformSettings>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = PlatformSettings;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: RefreshSettings) -> Result<Self::Ok, Self::Err> {
        let stored = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;

        let Some(settings) = stored else {
            log::debug!("no `PlatformSettings` stored, keeping the last known");
            return Ok(self.settings());
        };
        if settings != self.settings() {
            log::info!("`PlatformSettings` changed: {settings:?}");
        }
        self.set_settings(settings);
        Ok(settings)
    }
}

/// Error of [`RefreshSettings`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::money::Currency;

    use crate::{
        domain::PlatformSettings,
        infra::{database::memory::Table, Memory},
        spec::service,
        Command as _,
    };

    use super::RefreshSettings;

    fn custom() -> PlatformSettings {
        PlatformSettings {
            client_surcharge: "12".parse().unwrap(),
            platform_fee: "20".parse().unwrap(),
            currency: Currency::Usd,
        }
    }

    #[tokio::test]
    async fn loads_stored_settings() {
        let db = Memory::new();
        db.put_settings(custom());
        let svc = service(&db);

        let settings = svc.execute(RefreshSettings).await.unwrap();

        assert_eq!(settings, custom());
        assert_eq!(svc.settings(), custom());
    }

    #[tokio::test]
    async fn keeps_last_known_settings() {
        let db = Memory::new();
        let svc = service(&db);

        let settings = svc.execute(RefreshSettings).await.unwrap();
        assert_eq!(settings, PlatformSettings::default());

        db.put_settings(custom());
        _ = svc.execute(RefreshSettings).await.unwrap();

        db.set_failing(Table::Settings, true);
        assert!(svc.execute(RefreshSettings).await.is_err());
        assert_eq!(svc.settings(), custom());
    }
}
