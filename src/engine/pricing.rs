// pricing.rs
use rust_decimal::Decimal;

use crate::engine::optimizer::{ArbDirection, FeeSchedule};
use crate::errors::{ArbError, Result};
use crate::math::constant_product::{simulate_exact_in, Pool};
use crate::models::{Chain, ReserveSnapshot};

/// USDC -> ZERC on the origin chain, bridge 1:1, ZERC -> USDC on the destination chain,
/// quoted at one input size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteQuote {
    pub direction: ArbDirection,
    pub amount_in_usdc: Decimal,
    pub amount_bridged_zerc: Decimal,
    pub amount_out_usdc: Decimal,
    /// May be negative at sizes past the optimum.
    pub profit_usdc: Decimal,
    pub buy_price_usdc_per_zerc: Decimal,
    pub sell_price_usdc_per_zerc: Decimal,
    pub origin_price_impact_percent: Decimal,
    pub destination_price_impact_percent: Decimal,
}

/// Both directions at the same input size.
#[derive(Clone, Copy, Debug)]
pub struct DirectionalQuotes {
    pub eth_to_poly: RouteQuote,
    pub poly_to_eth: RouteQuote,
}

impl DirectionalQuotes {
    /// Higher profit wins; ties go to EthToPoly.
    pub fn best(&self) -> &RouteQuote {
        if self.poly_to_eth.profit_usdc > self.eth_to_poly.profit_usdc {
            &self.poly_to_eth
        } else {
            &self.eth_to_poly
        }
    }
}

/// The chain's pool oriented USDC in, ZERC out.
fn usdc_to_zerc_pool(snapshot: &ReserveSnapshot, chain: Chain, fees: &FeeSchedule) -> Result<Pool> {
    Pool::new(snapshot.usdc(chain), snapshot.zerc(chain), fees.for_chain(chain))
}

/// (source, destination): source sells USDC for ZERC on the origin chain, destination sells
/// the bridged ZERC for USDC.
pub fn direction_pools(
    snapshot: &ReserveSnapshot,
    direction: ArbDirection,
    fees: &FeeSchedule,
) -> Result<(Pool, Pool)> {
    let source = usdc_to_zerc_pool(snapshot, direction.origin_chain(), fees)?;
    let sink = usdc_to_zerc_pool(snapshot, direction.destination_chain(), fees)?.reversed();
    Ok((source, sink))
}

/// The bridge is the identity: whatever ZERC the first leg yields is the input of the second.
pub fn quote_route(
    direction: ArbDirection,
    source: &Pool,
    destination: &Pool,
    amount_in_usdc: Decimal,
) -> Result<RouteQuote> {
    let buy = simulate_exact_in(source, amount_in_usdc)?;
    let sell = simulate_exact_in(destination, buy.amount_out)?;

    let (buy_price, sell_price) = if buy.amount_out.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            amount_in_usdc
                .checked_div(buy.amount_out)
                .ok_or(ArbError::NumericOverflow("route buy price"))?,
            sell.amount_out
                .checked_div(buy.amount_out)
                .ok_or(ArbError::NumericOverflow("route sell price"))?,
        )
    };

    Ok(RouteQuote {
        direction,
        amount_in_usdc,
        amount_bridged_zerc: buy.amount_out,
        amount_out_usdc: sell.amount_out,
        profit_usdc: sell.amount_out - amount_in_usdc,
        buy_price_usdc_per_zerc: buy_price,
        sell_price_usdc_per_zerc: sell_price,
        origin_price_impact_percent: buy.price_impact_percent,
        destination_price_impact_percent: sell.price_impact_percent,
    })
}

pub fn quote_both_directions(
    snapshot: &ReserveSnapshot,
    fees: &FeeSchedule,
    amount_in_usdc: Decimal,
) -> Result<DirectionalQuotes> {
    let quote = |direction: ArbDirection| -> Result<RouteQuote> {
        let (source, destination) = direction_pools(snapshot, direction, fees)?;
        quote_route(direction, &source, &destination, amount_in_usdc)
    };
    Ok(DirectionalQuotes {
        eth_to_poly: quote(ArbDirection::EthToPoly)?,
        poly_to_eth: quote(ArbDirection::PolyToEth)?,
    })
}

/// Fee-free ZERC price in USDC on `chain`.
pub fn zerc_spot_price_usdc(snapshot: &ReserveSnapshot, chain: Chain) -> Result<Decimal> {
    usdc_to_zerc_pool(snapshot, chain, &FeeSchedule::uniform(Decimal::ZERO))?
        .reversed()
        .spot_price()
}
