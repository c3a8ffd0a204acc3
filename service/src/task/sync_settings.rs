//! [`SyncSettings`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{self, Command},
    domain::PlatformSettings,
    Service,
};

use super::Task;

/// Configuration for [`SyncSettings`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`PlatformSettings`] reloads.
    pub interval: time::Duration,
}

/// [`Task`] periodically reloading the [`PlatformSettings`].
#[derive(Clone, Copy, Debug)]
pub struct SyncSettings<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Pay> Task<Start<By<SyncSettings<Self>, Config>>> for Service<Db, Pay>
where
    SyncSettings<Service<Db, Pay>>: Task<Perform<()>, Ok = (), Err: Error>,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SyncSettings<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SyncSettings {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::warn!(
                    "`task::SyncSettings` failed, keeping the last known \
                     `PlatformSettings`: {e}",
                );
            });
        }
    }
}

impl<Db, Pay> Task<Perform<()>> for SyncSettings<Service<Db, Pay>>
where
    Service<Db, Pay>: Command<
        command::RefreshSettings,
        Ok = PlatformSettings,
        Err = Traced<command::refresh_settings::ExecutionError>,
    >,
{
    type Ok = ();
    type Err = Traced<command::refresh_settings::ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service
            .execute(command::RefreshSettings)
            .await
            .map(drop)
    }
}
