use std::str::FromStr;
use std::sync::Arc;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, State};
use rust_decimal::Decimal;

use crate::bootstrap::AppState;
use crate::engine::service::{analyze_arbitrage, find_optimal_arbitrage};
use crate::models::ReserveSnapshot;
use crate::web::dto::{
    ArbitrageResponse, ErrorResponse, OptimalArbitrageResponse, ReservesQuery, RouteDetails,
    SpotPrices,
};

type ApiResult<T> = Result<Json<T>, (Status, Json<ErrorResponse>)>;

fn bad_request(message: impl Into<String>) -> (Status, Json<ErrorResponse>) {
    (Status::BadRequest, Json(ErrorResponse { error: message.into() }))
}

fn parse_decimal(name: &str, raw: &str) -> Result<Decimal, (Status, Json<ErrorResponse>)> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| bad_request(format!("{name}: cannot parse '{raw}' as a decimal: {e}")))
}

fn snapshot_from(query: &ReservesQuery) -> Result<ReserveSnapshot, (Status, Json<ErrorResponse>)> {
    Ok(ReserveSnapshot::new(
        parse_decimal("usdc_ethereum", &query.usdc_ethereum)?,
        parse_decimal("zerc_ethereum", &query.zerc_ethereum)?,
        parse_decimal("usdc_polygon", &query.usdc_polygon)?,
        parse_decimal("zerc_polygon", &query.zerc_polygon)?,
    ))
}

#[get("/api/v1/arbitrage-opportunity?<query..>")]
pub fn arbitrage_opportunity(
    query: ReservesQuery,
    app_state: &State<Arc<AppState>>,
) -> ApiResult<ArbitrageResponse> {
    let snapshot = snapshot_from(&query)?;
    let amount_in = match query.amount_in_usdc.as_deref() {
        Some(raw) => parse_decimal("amount_in_usdc", raw)?,
        None => app_state.default_trade_size_usdc,
    };

    let analysis = analyze_arbitrage(&snapshot, &app_state.settings, amount_in).map_err(|e| {
        log::error!("Failed to analyze arbitrage: {}", e);
        bad_request(e.to_string())
    })?;

    Ok(Json(ArbitrageResponse {
        timestamp_utc: analysis.timestamp_utc,
        amount_in_usdc: analysis.amount_in_usdc,
        spot_prices: SpotPrices {
            zerc_price_ethereum_usdc: analysis.zerc_price_ethereum,
            zerc_price_polygon_usdc: analysis.zerc_price_polygon,
            price_gap_percent: analysis.price_gap_percent,
        },
        eth_to_poly: RouteDetails::from(&analysis.eth_to_poly),
        poly_to_eth: RouteDetails::from(&analysis.poly_to_eth),
        best_direction: analysis.best_direction,
        best_profit_usdc: analysis.best_profit_usdc,
        recommended_action: analysis.recommended_action,
    }))
}

#[get("/api/v1/optimal-arbitrage?<query..>")]
pub fn optimal_arbitrage_opportunity(
    query: ReservesQuery,
    app_state: &State<Arc<AppState>>,
) -> ApiResult<OptimalArbitrageResponse> {
    let snapshot = snapshot_from(&query)?;

    let analysis = find_optimal_arbitrage(&snapshot, &app_state.settings).map_err(|e| {
        log::error!("Failed to find optimal arbitrage: {}", e);
        bad_request(e.to_string())
    })?;
    let result = analysis.result;

    Ok(Json(OptimalArbitrageResponse {
        timestamp_utc: analysis.timestamp_utc,
        spot_prices: SpotPrices {
            zerc_price_ethereum_usdc: analysis.zerc_price_ethereum,
            zerc_price_polygon_usdc: analysis.zerc_price_polygon,
            price_gap_percent: analysis.price_gap_percent,
        },
        optimal_direction: result.direction,
        buy_chain: result.origin_chain(),
        sell_chain: result.destination_chain(),
        optimal_amount_in_usdc: result.amount_in_usdc,
        amount_bridged_zerc: result.amount_bridged_zerc,
        amount_out_usdc: result.amount_out_usdc,
        profit_usdc: result.profit_usdc,
        effective_buy_price_usdc_per_zerc: analysis.effective_buy_price_usdc_per_zerc,
        effective_sell_price_usdc_per_zerc: analysis.effective_sell_price_usdc_per_zerc,
        recommended_action: analysis.recommended_action,
    }))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
