//! Service contains the business logic of the consultation booking engine.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod task;

use std::{
    error::Error,
    sync::{Arc, PoisonError, RwLock},
};

use common::{
    operations::{By, Start},
    DateTime, WallClock,
};

use crate::domain::{HolidayCalendar, PlatformSettings, Zone};
#[cfg(doc)]
use crate::infra::{Database, Gateway};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [`Zone`] of the lawyers' wall clock.
    ///
    /// All the dates and times of appointments are expressed in it.
    pub zone: Zone,

    /// [`HolidayCalendar`] no appointments are booked on.
    pub holidays: HolidayCalendar,

    /// [`PlatformSettings`] used until the stored ones are loaded.
    pub settings: PlatformSettings,

    /// [`task::ExpirePendingAppointments`] configuration.
    pub expire_pending_appointments: task::expire_pending_appointments::Config,

    /// [`task::SyncSettings`] configuration.
    pub sync_settings: task::sync_settings::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Pay> {
    /// Configuration of this [`Service`].
    config: Arc<Config>,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// Payment [`Gateway`] of this [`Service`].
    payment: Pay,

    /// Last known [`PlatformSettings`].
    settings: Arc<RwLock<PlatformSettings>>,
}

impl<Db, Pay> Service<Db, Pay> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        payment: Pay,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::ExpirePendingAppointments<Self>,
                        task::expire_pending_appointments::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Task<
                Start<
                    By<task::SyncSettings<Self>, task::sync_settings::Config>,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Self::without_tasks(config, database, payment);

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("expire_pending_appointments", async move {
            svc.execute(Start(By::<task::ExpirePendingAppointments<_>, _>::new(
                svc.config().expire_pending_appointments,
            )))
            .await
        });
        let svc = this.clone();
        bg.spawn("sync_settings", async move {
            svc.execute(Start(By::<task::SyncSettings<_>, _>::new(
                svc.config().sync_settings,
            )))
            .await
        });

        (this, bg)
    }

    /// Creates a new [`Service`] without spawning any background [`Task`].
    #[must_use]
    pub fn without_tasks(config: Config, database: Db, payment: Pay) -> Self {
        let settings = Arc::new(RwLock::new(config.settings));
        Self {
            config: Arc::new(config),
            database,
            payment,
            settings,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns payment [`Gateway`] of this [`Service`].
    #[must_use]
    pub fn payment(&self) -> &Pay {
        &self.payment
    }

    /// Returns the current moment on the lawyers' wall clock.
    #[must_use]
    pub fn now(&self) -> WallClock {
        self.config.zone.wall_clock(DateTime::now())
    }

    /// Returns a snapshot of the last known [`PlatformSettings`].
    #[must_use]
    pub fn settings(&self) -> PlatformSettings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the last known [`PlatformSettings`].
    fn set_settings(&self, settings: PlatformSettings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) =
            settings;
    }
}
