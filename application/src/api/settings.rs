//! [`PlatformSettings`] definition.

use common::Percent;
use juniper::GraphQLObject;
use service::domain;

/// Settings of the platform applied to the consultation prices.
#[derive(Clone, Debug, GraphQLObject)]
pub struct PlatformSettings {
    /// Surcharge added to the price paid by clients.
    pub client_surcharge: Percent,

    /// Fee withheld from the lawyers' payouts.
    pub platform_fee: Percent,

    /// Three-letter code of the currency prices are quoted in.
    pub currency: String,
}

impl From<domain::PlatformSettings> for PlatformSettings {
    fn from(settings: domain::PlatformSettings) -> Self {
        let domain::PlatformSettings {
            client_surcharge,
            platform_fee,
            currency,
        } = settings;
        Self {
            client_surcharge,
            platform_fee,
            currency: currency.to_string(),
        }
    }
}

