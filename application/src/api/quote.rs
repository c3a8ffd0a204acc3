//! [`PriceQuote`] definition.

use common::{Money, Percent};
use juniper::GraphQLObject;
use service::domain;

/// Price breakdown of a consultation.
#[derive(Clone, Copy, Debug, GraphQLObject)]
pub struct PriceQuote {
    /// Price of the consultation at the lawyer's hourly rate.
    pub base: Money,

    /// Discount applied to the `base` price.
    pub discount: Money,

    /// Rate of the `discount`.
    pub discount_rate: Percent,

    /// Price after the `discount`.
    pub subtotal: Money,

    /// Platform surcharge paid by the client.
    pub surcharge: Money,

    /// Rate of the `surcharge`.
    pub surcharge_rate: Percent,

    /// Price the client pays.
    pub total: Money,

    /// Amount the lawyer receives after the platform fee.
    pub lawyer_payout: Money,
}

impl PriceQuote {
    /// Creates a new [`PriceQuote`] out of the provided [`domain::Quote`],
    /// reporting the lawyer payout with the provided platform fee.
    #[must_use]
    pub fn new(quote: domain::Quote, platform_fee: Percent) -> Self {
        Self {
            base: quote.base,
            discount: quote.discount,
            discount_rate: quote.discount_rate,
            subtotal: quote.subtotal,
            surcharge: quote.surcharge,
            surcharge_rate: quote.surcharge_rate,
            total: quote.total,
            lawyer_payout: quote.lawyer_payout(platform_fee),
        }
    }
}
