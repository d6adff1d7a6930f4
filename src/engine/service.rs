use std::time::Instant;

use rust_decimal::Decimal;

use crate::engine::{
    optimizer::{optimize, ArbDirection, ArbitrageResult, OptimizerSettings},
    pricing::{quote_both_directions, zerc_spot_price_usdc, RouteQuote},
};
use crate::errors::{ArbError, Result};
use crate::models::{Chain, ReserveSnapshot};

pub const ARBITRAGE_DETECTED: &str = "ARBITRAGE_DETECTED";
pub const NO_ARBITRAGE: &str = "NO_ARBITRAGE";
pub const PROFITABLE_ARBITRAGE_FOUND: &str = "PROFITABLE_ARBITRAGE_FOUND";
pub const NO_ARBITRAGE_OPPORTUNITY: &str = "NO_ARBITRAGE_OPPORTUNITY";

/// Both routes quoted at one caller-chosen size.
#[derive(Clone, Debug)]
pub struct ArbitrageAnalysis {
    pub timestamp_utc: String,
    pub amount_in_usdc: Decimal,

    // ZERC spot prices (USDC per ZERC, before fees)
    pub zerc_price_ethereum: Decimal,
    pub zerc_price_polygon: Decimal,
    pub price_gap_percent: Decimal, // (polygon - ethereum) / ethereum * 100

    pub eth_to_poly: RouteQuote,
    pub poly_to_eth: RouteQuote,

    pub best_direction: Option<ArbDirection>,
    pub best_profit_usdc: Decimal,
    pub recommended_action: String,
}

pub fn analyze_arbitrage(
    snapshot: &ReserveSnapshot,
    settings: &OptimizerSettings,
    amount_in_usdc: Decimal,
) -> Result<ArbitrageAnalysis> {
    snapshot.validate()?;
    settings.fees.validate()?;
    if amount_in_usdc < Decimal::ZERO {
        return Err(ArbError::InvalidAmount(amount_in_usdc));
    }

    let (zerc_price_ethereum, zerc_price_polygon, price_gap_percent) = spot_prices(snapshot)?;
    let quotes = quote_both_directions(snapshot, &settings.fees, amount_in_usdc)?;
    let best = quotes.best();

    let (best_direction, best_profit_usdc, action) = if best.profit_usdc > Decimal::ZERO {
        (Some(best.direction), best.profit_usdc, ARBITRAGE_DETECTED)
    } else {
        (None, Decimal::ZERO, NO_ARBITRAGE)
    };
    log::info!(
        "{amount_in_usdc} USDC: eth->poly {} / poly->eth {} -> {action}",
        quotes.eth_to_poly.profit_usdc,
        quotes.poly_to_eth.profit_usdc
    );

    Ok(ArbitrageAnalysis {
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        amount_in_usdc,
        zerc_price_ethereum,
        zerc_price_polygon,
        price_gap_percent,
        eth_to_poly: quotes.eth_to_poly,
        poly_to_eth: quotes.poly_to_eth,
        best_direction,
        best_profit_usdc,
        recommended_action: action.to_string(),
    })
}

/// The optimizer's answer, with the prices around it.
#[derive(Clone, Debug)]
pub struct OptimalArbitrageAnalysis {
    pub timestamp_utc: String,
    pub result: ArbitrageResult,
    pub zerc_price_ethereum: Decimal,
    pub zerc_price_polygon: Decimal,
    pub price_gap_percent: Decimal,
    /// USDC paid per ZERC on the origin chain; zero without a trade.
    pub effective_buy_price_usdc_per_zerc: Decimal,
    /// USDC received per ZERC on the destination chain; zero without a trade.
    pub effective_sell_price_usdc_per_zerc: Decimal,
    pub recommended_action: String,
}

pub fn find_optimal_arbitrage(
    snapshot: &ReserveSnapshot,
    settings: &OptimizerSettings,
) -> Result<OptimalArbitrageAnalysis> {
    let start = Instant::now();
    let result = optimize(snapshot, settings)?;
    log::debug!("{} optimization completed in {:?}", settings.method, start.elapsed());

    let (zerc_price_ethereum, zerc_price_polygon, price_gap_percent) = spot_prices(snapshot)?;

    let (buy_price, sell_price) = if result.amount_bridged_zerc.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            result
                .amount_in_usdc
                .checked_div(result.amount_bridged_zerc)
                .ok_or(ArbError::NumericOverflow("effective buy price"))?,
            result
                .amount_out_usdc
                .checked_div(result.amount_bridged_zerc)
                .ok_or(ArbError::NumericOverflow("effective sell price"))?,
        )
    };

    let action = match result.direction {
        Some(direction) => {
            log::info!(
                "{direction}: trade {} USDC for {} USDC profit",
                result.amount_in_usdc,
                result.profit_usdc
            );
            PROFITABLE_ARBITRAGE_FOUND
        }
        None => {
            log::info!("no profitable trade between {} and {}", Chain::Ethereum, Chain::Polygon);
            NO_ARBITRAGE_OPPORTUNITY
        }
    };

    Ok(OptimalArbitrageAnalysis {
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        result,
        zerc_price_ethereum,
        zerc_price_polygon,
        price_gap_percent,
        effective_buy_price_usdc_per_zerc: buy_price,
        effective_sell_price_usdc_per_zerc: sell_price,
        recommended_action: action.to_string(),
    })
}

fn spot_prices(snapshot: &ReserveSnapshot) -> Result<(Decimal, Decimal, Decimal)> {
    let ethereum = zerc_spot_price_usdc(snapshot, Chain::Ethereum)?;
    let polygon = zerc_spot_price_usdc(snapshot, Chain::Polygon)?;
    let gap = (polygon - ethereum)
        .checked_div(ethereum)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(ArbError::NumericOverflow("price gap"))?;
    Ok((ethereum, polygon, gap.round_dp(6)))
}
