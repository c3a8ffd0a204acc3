//! Consultation pricing.

use common::{money::Currency, Money, Percent};
use rust_decimal::Decimal;

use crate::domain::{appointment::Duration, lawyer::HourlyRate};

/// Discount granted on the first consultation between a client and a lawyer.
#[expect(unsafe_code, reason = "bypass")]
pub const FIRST_CONSULTATION_DISCOUNT: Percent =
    // SAFETY: `40` is within `0..=100`.
    unsafe { Percent::new_unchecked(Decimal::from_parts(40, 0, 0, false, 0)) };

/// Price breakdown of a consultation.
///
/// All the amounts are rounded to the smallest unit of their currency.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quote {
    /// Price of the consultation at the lawyer's hourly rate.
    pub base: Money,

    /// Discount subtracted from the [`Quote::base`].
    pub discount: Money,

    /// Rate of the [`Quote::discount`].
    pub discount_rate: Percent,

    /// [`Quote::base`] minus [`Quote::discount`], never negative.
    pub subtotal: Money,

    /// Platform surcharge added on top of the [`Quote::subtotal`].
    pub surcharge: Money,

    /// Rate of the [`Quote::surcharge`].
    pub surcharge_rate: Percent,

    /// Amount the client pays.
    pub total: Money,
}

impl Quote {
    /// Returns the amount the lawyer receives once the platform fee is
    /// retained from the [`Quote::subtotal`].
    #[must_use]
    pub fn lawyer_payout(&self, platform_fee: Percent) -> Money {
        self.subtotal
            .saturating_sub(self.subtotal.scale(platform_fee.fraction()))
    }
}

/// Computes the [`Quote`] of a consultation.
///
/// Rounding happens after every step, halves away from zero.
#[must_use]
pub fn quote(
    hourly_rate: HourlyRate,
    duration: Duration,
    is_first_consultation: bool,
    surcharge_rate: Percent,
    currency: Currency,
) -> Quote {
    let rate = Money {
        amount: hourly_rate.amount(),
        currency,
    };
    let base = rate.scale(Decimal::from(duration.minutes()) / Decimal::from(60));

    let discount_rate = if is_first_consultation {
        FIRST_CONSULTATION_DISCOUNT
    } else {
        Percent::ZERO
    };
    let discount = base.scale(discount_rate.fraction());

    let subtotal = base.saturating_sub(discount);
    let surcharge = subtotal.scale(surcharge_rate.fraction());

    Quote {
        base,
        discount,
        discount_rate,
        subtotal,
        surcharge,
        surcharge_rate,
        total: subtotal + surcharge,
    }
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money, Percent};
    use rust_decimal::Decimal;

    use crate::domain::{appointment::Duration, lawyer::HourlyRate};

    use super::{quote, FIRST_CONSULTATION_DISCOUNT};

    fn clp(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Clp,
        }
    }

    fn rate(amount: i64) -> HourlyRate {
        HourlyRate::new(Decimal::from(amount)).unwrap()
    }

    fn percent(s: &str) -> Percent {
        s.parse().unwrap()
    }

    fn minutes(m: u16) -> Duration {
        Duration::new(m).unwrap()
    }

    #[test]
    fn discounts_first_consultation() {
        let q = quote(
            rate(100_000),
            Duration::HOUR,
            true,
            percent("10"),
            Currency::Clp,
        );

        assert_eq!(q.base, clp(100_000));
        assert_eq!(q.discount, clp(40_000));
        assert_eq!(q.discount_rate, FIRST_CONSULTATION_DISCOUNT);
        assert_eq!(q.subtotal, clp(60_000));
        assert_eq!(q.surcharge, clp(6_000));
        assert_eq!(q.total, clp(66_000));
    }

    #[test]
    fn prorates_hourly_rate() {
        let q = quote(
            rate(90_000),
            minutes(30),
            false,
            percent("10"),
            Currency::Clp,
        );

        assert_eq!(q.base, clp(45_000));
        assert_eq!(q.discount, clp(0));
        assert_eq!(q.discount_rate, Percent::ZERO);
        assert_eq!(q.subtotal, clp(45_000));
        assert_eq!(q.surcharge, clp(4_500));
        assert_eq!(q.total, clp(49_500));
    }

    #[test]
    fn rounds_every_step() {
        let q = quote(
            rate(33_333),
            minutes(15),
            true,
            percent("12.5"),
            Currency::Clp,
        );
        // base = 8333.25 -> 8333, discount = 3333.2 -> 3333,
        // subtotal = 5000, surcharge = 625.
        assert_eq!(q.base, clp(8_333));
        assert_eq!(q.discount, clp(3_333));
        assert_eq!(q.subtotal, clp(5_000));
        assert_eq!(q.surcharge, clp(625));
        assert_eq!(q.total, clp(5_625));
    }

    #[test]
    fn rounds_halves_away_from_zero() {
        // base = 10 * 45 / 60 = 7.5 -> 8, surcharge = 0.8 -> 1.
        let q = quote(
            rate(10),
            minutes(45),
            false,
            percent("10"),
            Currency::Clp,
        );

        assert_eq!(q.base, clp(8));
        assert_eq!(q.surcharge, clp(1));
        assert_eq!(q.total, clp(9));
    }

    #[test]
    fn zero_rate_is_free() {
        let q = quote(rate(0), Duration::HOUR, true, percent("10"), Currency::Clp);

        assert_eq!(q.total, clp(0));
        assert_eq!(q.lawyer_payout(percent("15")), clp(0));
    }

    #[test]
    fn computes_lawyer_payout() {
        let q = quote(
            rate(90_000),
            minutes(30),
            false,
            percent("10"),
            Currency::Clp,
        );

        assert_eq!(q.lawyer_payout(percent("15")), clp(38_250));
        assert_eq!(q.lawyer_payout(Percent::ZERO), q.subtotal);
        assert_eq!(q.lawyer_payout(percent("100")), clp(0));
    }
}
