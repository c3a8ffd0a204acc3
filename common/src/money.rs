//! [`Money`]-related definitions.

use std::{fmt, ops, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Rounds this [`Money`] to the smallest unit of its [`Currency`].
    ///
    /// Halves are rounded away from zero.
    #[must_use]
    pub fn round(self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency.exponent(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }

    /// Returns this [`Money`] scaled by the provided `factor` and rounded to
    /// the smallest unit of its [`Currency`].
    #[must_use]
    pub fn scale(self, factor: Decimal) -> Self {
        Self {
            amount: self.amount * factor,
            currency: self.currency,
        }
        .round()
    }

    /// Subtracts the provided amount, saturating at zero.
    ///
    /// # Panics
    ///
    /// If the currencies of the amounts differ.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        assert_eq!(self.currency, rhs.currency, "currency mismatch");
        Self {
            amount: (self.amount - rhs.amount).max(Decimal::ZERO),
            currency: self.currency,
        }
    }
}

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(self.currency, rhs.currency, "currency mismatch");
        Self {
            amount: self.amount + rhs.amount,
            currency: self.currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        write!(f, "{}{currency}", amount.normalize())
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Chilean Peso."]
        Clp = 1,

        #[doc = "US Dollar."]
        Usd = 2,

        #[doc = "Euro."]
        Eur = 3,
    }
}

impl Currency {
    /// Returns the number of decimal places of the smallest unit of this
    /// [`Currency`].
    #[must_use]
    pub const fn exponent(self) -> u32 {
        match self {
            Self::Clp => 0,
            Self::Usd | Self::Eur => 2,
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer;
    /// - `currency` is a three-letter currency code.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn clp(s: &str) -> Money {
        Money {
            amount: decimal(s),
            currency: Currency::Clp,
        }
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("66000CLP").unwrap(), clp("66000"));
        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Usd,
            },
        );
        assert_eq!(
            Money::from_str("123.45EUR").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Eur,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Cl").is_err());
        assert!(Money::from_str("123.45Pesos").is_err());

        assert!(Money::from_str("123.00USD").is_ok());
        assert!(Money::from_str("123USD").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(clp("49500").to_string(), "49500CLP");
        assert_eq!(clp("49500.0").to_string(), "49500CLP");
        assert_eq!(
            Money {
                amount: decimal("123.45"),
                currency: Currency::Usd,
            }
            .to_string(),
            "123.45USD",
        );
        assert_eq!(
            Money {
                amount: decimal("123.50"),
                currency: Currency::Eur,
            }
            .to_string(),
            "123.5EUR",
        );
    }

    #[test]
    fn converts_currency_from_stored_value() {
        assert_eq!(Currency::try_from(1), Ok(Currency::Clp));
        assert_eq!(Currency::try_from(3), Ok(Currency::Eur));
        assert_eq!(
            Currency::try_from(9),
            Err("invalid `Currency` value: 9".to_owned()),
        );
        assert_eq!(Currency::Usd.to_string(), "USD");
    }

    #[test]
    fn rounds_to_smallest_unit() {
        assert_eq!(clp("100.5").round(), clp("101"));
        assert_eq!(clp("100.49").round(), clp("100"));
        assert_eq!(clp("2.5").round(), clp("3"));

        assert_eq!(
            Money {
                amount: decimal("10.005"),
                currency: Currency::Usd,
            }
            .round(),
            Money {
                amount: decimal("10.01"),
                currency: Currency::Usd,
            },
        );
    }

    #[test]
    fn scales_and_subtracts() {
        assert_eq!(clp("45000").scale(decimal("0.1")), clp("4500"));
        assert_eq!(clp("15").scale(decimal("0.1")), clp("2"));
        assert_eq!(clp("100").saturating_sub(clp("250")), clp("0"));
        assert_eq!(clp("60000") + clp("6000"), clp("66000"));
    }
}
