//! [`Config`]-related definitions.

use std::time;

use common::{money::Currency, Date, Percent};
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::{
    domain::{
        settings::{DEFAULT_CLIENT_SURCHARGE, DEFAULT_PLATFORM_FEE},
        zone, HolidayCalendar, PlatformSettings, Zone,
    },
    infra::payment,
};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Payment provider configuration.
    pub payment: Payment,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// IANA time zone of the lawyers' wall clock.
    #[default(zone::SANTIAGO.to_owned())]
    pub time_zone: String,

    /// Extra non-bookable dates in addition to the Chilean public holidays.
    pub holidays: Vec<Date>,

    /// Platform settings used until the stored ones are loaded.
    pub settings: Settings,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

impl TryFrom<Service> for service::Config {
    type Error = zone::UnknownZone;

    fn try_from(value: Service) -> Result<Self, Self::Error> {
        let Service {
            time_zone,
            holidays,
            settings:
                Settings {
                    client_surcharge,
                    platform_fee,
                    currency,
                },
            tasks:
                Tasks {
                    expire_pending_appointments,
                    sync_settings,
                },
        } = value;

        Ok(Self {
            zone: Zone::get(&time_zone)?,
            holidays: HolidayCalendar::chile().with_dates(holidays),
            settings: PlatformSettings {
                client_surcharge,
                platform_fee,
                currency,
            },
            expire_pending_appointments:
                service::task::expire_pending_appointments::Config {
                    interval: expire_pending_appointments.interval,
                    ttl: expire_pending_appointments.ttl,
                },
            sync_settings: service::task::sync_settings::Config {
                interval: sync_settings.interval,
            },
        })
    }
}

/// Platform settings configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Settings {
    /// Surcharge added to the price paid by clients.
    #[default(DEFAULT_CLIENT_SURCHARGE)]
    pub client_surcharge: Percent,

    /// Fee withheld from the lawyers' payouts.
    #[default(DEFAULT_PLATFORM_FEE)]
    pub platform_fee: Percent,

    /// Currency prices are quoted in.
    #[default(Currency::Clp)]
    pub currency: Currency,
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `ExpirePendingAppointments` task configuration.
    pub expire_pending_appointments: ExpireTask,

    /// `SyncSettings` task configuration.
    pub sync_settings: Task,
}

/// Configuration of the task cancelling abandoned bookings.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct ExpireTask {
    /// Task execution interval.
    #[default(time::Duration::from_secs(60))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,

    /// Time after which an unpaid booking is cancelled.
    #[default(time::Duration::from_secs(30 * 60))]
    #[serde(with = "humantime_serde")]
    pub ttl: time::Duration,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Task execution interval.
    #[default(time::Duration::from_secs(5 * 60))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,
}

/// Payment provider configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Payment {
    /// Base URL of the hosted checkout page.
    #[default("http://127.0.0.1:8081/checkout".to_owned())]
    pub checkout_url: String,
}

impl From<Payment> for payment::Redirect {
    fn from(value: Payment) -> Self {
        let Payment { checkout_url } = value;
        Self {
            base_url: checkout_url,
        }
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
