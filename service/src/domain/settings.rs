//! [`PlatformSettings`] definitions.

use common::{money::Currency, Percent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default [`PlatformSettings::client_surcharge`].
#[expect(unsafe_code, reason = "bypass")]
pub const DEFAULT_CLIENT_SURCHARGE: Percent =
    // SAFETY: `10` is within `0..=100`.
    unsafe { Percent::new_unchecked(Decimal::from_parts(10, 0, 0, false, 0)) };

/// Default [`PlatformSettings::platform_fee`].
#[expect(unsafe_code, reason = "bypass")]
pub const DEFAULT_PLATFORM_FEE: Percent =
    // SAFETY: `15` is within `0..=100`.
    unsafe { Percent::new_unchecked(Decimal::from_parts(15, 0, 0, false, 0)) };

/// Platform-wide pricing options.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// Surcharge the client pays on top of a consultation subtotal.
    pub client_surcharge: Percent,

    /// Fee the platform retains from a lawyer's payout.
    pub platform_fee: Percent,

    /// [`Currency`] consultations are priced in.
    pub currency: Currency,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            client_surcharge: DEFAULT_CLIENT_SURCHARGE,
            platform_fee: DEFAULT_PLATFORM_FEE,
            currency: Currency::Clp,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Percent};

    use super::PlatformSettings;

    #[test]
    fn has_documented_defaults() {
        let settings = PlatformSettings::default();

        assert_eq!(settings.client_surcharge, "10".parse::<Percent>().unwrap());
        assert_eq!(settings.platform_fee, "15".parse::<Percent>().unwrap());
        assert_eq!(settings.currency, Currency::Clp);
    }

    #[test]
    fn deserializes_partially() {
        let settings: PlatformSettings =
            serde_json::from_str(r#"{ "client_surcharge": 12.5 }"#).unwrap();

        assert_eq!(settings.client_surcharge, "12.5".parse::<Percent>().unwrap());
        assert_eq!(settings.platform_fee, PlatformSettings::default().platform_fee);
        assert_eq!(settings.currency, Currency::Clp);
    }
}
