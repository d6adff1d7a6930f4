use rocket::serde::{Deserialize, Serialize};
use rust_decimal::Decimal;

use crate::engine::optimizer::ArbDirection;
use crate::engine::pricing::RouteQuote;
use crate::models::Chain;

/// Reserves arrive as strings so that decimals keep every digit the caller sent.
#[derive(Debug, Deserialize, rocket::FromForm)]
pub struct ReservesQuery {
    pub usdc_ethereum: String,
    pub zerc_ethereum: String,
    pub usdc_polygon: String,
    pub zerc_polygon: String,
    pub amount_in_usdc: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpotPrices {
    pub zerc_price_ethereum_usdc: Decimal,
    pub zerc_price_polygon_usdc: Decimal,
    pub price_gap_percent: Decimal, // (polygon - ethereum) / ethereum
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteDetails {
    pub direction: ArbDirection,
    pub buy_chain: Chain,
    pub sell_chain: Chain,
    pub amount_in_usdc: Decimal,
    pub amount_bridged_zerc: Decimal,
    pub amount_out_usdc: Decimal,
    pub profit_usdc: Decimal, // negative when the route loses money
    pub buy_price_usdc_per_zerc: Decimal,
    pub sell_price_usdc_per_zerc: Decimal,
    pub buy_price_impact_percent: Decimal,
    pub sell_price_impact_percent: Decimal,
}

impl From<&RouteQuote> for RouteDetails {
    fn from(quote: &RouteQuote) -> Self {
        RouteDetails {
            direction: quote.direction,
            buy_chain: quote.direction.origin_chain(),
            sell_chain: quote.direction.destination_chain(),
            amount_in_usdc: quote.amount_in_usdc,
            amount_bridged_zerc: quote.amount_bridged_zerc,
            amount_out_usdc: quote.amount_out_usdc,
            profit_usdc: quote.profit_usdc,
            buy_price_usdc_per_zerc: quote.buy_price_usdc_per_zerc,
            sell_price_usdc_per_zerc: quote.sell_price_usdc_per_zerc,
            buy_price_impact_percent: quote.origin_price_impact_percent,
            sell_price_impact_percent: quote.destination_price_impact_percent,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArbitrageResponse {
    pub timestamp_utc: String,
    pub amount_in_usdc: Decimal,
    pub spot_prices: SpotPrices,
    pub eth_to_poly: RouteDetails,
    pub poly_to_eth: RouteDetails,
    pub best_direction: Option<ArbDirection>,
    pub best_profit_usdc: Decimal,
    pub recommended_action: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimalArbitrageResponse {
    pub timestamp_utc: String,
    pub spot_prices: SpotPrices,
    pub optimal_direction: Option<ArbDirection>,
    pub buy_chain: Option<Chain>,
    pub sell_chain: Option<Chain>,
    pub optimal_amount_in_usdc: Decimal,
    pub amount_bridged_zerc: Decimal,
    pub amount_out_usdc: Decimal,
    pub profit_usdc: Decimal,
    pub effective_buy_price_usdc_per_zerc: Decimal,
    pub effective_sell_price_usdc_per_zerc: Decimal,
    pub recommended_action: String,
}
