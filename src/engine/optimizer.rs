// src/engine/optimizer.rs
// ============================================================================
// Optimal USDC input for the cross-chain USDC/ZERC route between the Ethereum and Polygon
// constant-product pools, joined by an instant 1:1 ZERC bridge.
//
// Direction EthToPoly: USDC->ZERC on Ethereum, bridge, ZERC->USDC on Polygon.
// Direction PolyToEth: USDC->ZERC on Polygon, bridge, ZERC->USDC on Ethereum.
//
// Profit in USDC: P(x) = out_dst(out_src(x)) - x.
//
// Composing the two legs (a1,b1 = source USDC/ZERC reserves, a2,b2 = destination ZERC/USDC
// reserves, γ = 1 - fee):
//
//   out(x) = A x / (B + C x),  A = γ1 γ2 b1 b2,  B = a1 a2,  C = γ1 (a2 + γ2 b1)
//
// P is strictly concave, P'(0) = A/B - 1, and P'(x) = 0 at x* = (sqrt(A B) - B) / C.
// A trade is profitable iff A > B.
//
// The closed form runs on exact integers; the golden-section search is the fallback and
// an alternative solver.
//

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{Signed, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::pricing::{direction_pools, quote_route, RouteQuote};
use crate::errors::{ArbError, Result};
use crate::math::constant_product::{validate_fee, Pool, STANDARD_FEE_RATE};
use crate::math::fixed_point::{common_scale, from_scaled_int, pow10, to_scaled_int, MAX_SCALE};
use crate::models::{Chain, ReserveSnapshot};

/// Two arbitrage directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArbDirection {
    EthToPoly, // buy ZERC on Ethereum, sell on Polygon
    PolyToEth, // buy ZERC on Polygon,  sell on Ethereum
}

impl ArbDirection {
    pub const ALL: [ArbDirection; 2] = [ArbDirection::EthToPoly, ArbDirection::PolyToEth];

    /// Chain where USDC is committed and ZERC bought.
    pub fn origin_chain(&self) -> Chain {
        match self {
            ArbDirection::EthToPoly => Chain::Ethereum,
            ArbDirection::PolyToEth => Chain::Polygon,
        }
    }

    /// Chain where the bridged ZERC is sold back into USDC.
    pub fn destination_chain(&self) -> Chain {
        match self {
            ArbDirection::EthToPoly => Chain::Polygon,
            ArbDirection::PolyToEth => Chain::Ethereum,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArbDirection::EthToPoly => "ETH_TO_POLY",
            ArbDirection::PolyToEth => "POLY_TO_ETH",
        }
    }
}

impl fmt::Display for ArbDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Swap fee per pool. Passed in per call; nothing process-wide.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FeeSchedule {
    pub ethereum: Decimal,
    pub polygon: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::uniform(STANDARD_FEE_RATE)
    }
}

impl FeeSchedule {
    pub fn uniform(fee_rate: Decimal) -> Self {
        Self { ethereum: fee_rate, polygon: fee_rate }
    }

    pub fn for_chain(&self, chain: Chain) -> Decimal {
        match chain {
            Chain::Ethereum => self.ethereum,
            Chain::Polygon => self.polygon,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_fee(self.ethereum)?;
        validate_fee(self.polygon)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolveMethod {
    /// Exact root of P'(x) = 0, golden-section search if it fails its sanity check.
    ClosedForm,
    GoldenSection,
}

impl FromStr for SolveMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "closed-form" => Ok(SolveMethod::ClosedForm),
            "golden-section" => Ok(SolveMethod::GoldenSection),
            other => Err(format!("unknown solve method '{other}'")),
        }
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveMethod::ClosedForm => f.write_str("closed-form"),
            SolveMethod::GoldenSection => f.write_str("golden-section"),
        }
    }
}

/// All knobs the optimizer takes for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizerSettings {
    pub fees: FeeSchedule,
    pub method: SolveMethod,
    /// Cap on bracket doublings and on golden-section steps, each.
    pub max_iterations: u32,
    /// Golden-section stops once the bracket is narrower than `tolerance * upper`.
    pub tolerance: Decimal,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            method: SolveMethod::ClosedForm,
            max_iterations: 256,
            tolerance: Decimal::new(1, 12),
        }
    }
}

/// Result of the optimizer. All zero with no direction when nothing is profitable.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageResult {
    pub direction: Option<ArbDirection>,
    pub amount_in_usdc: Decimal,
    pub amount_bridged_zerc: Decimal,
    pub amount_out_usdc: Decimal,
    pub profit_usdc: Decimal,
}

impl ArbitrageResult {
    pub fn no_trade() -> Self {
        Self {
            direction: None,
            amount_in_usdc: Decimal::ZERO,
            amount_bridged_zerc: Decimal::ZERO,
            amount_out_usdc: Decimal::ZERO,
            profit_usdc: Decimal::ZERO,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.direction.is_some()
    }

    pub fn origin_chain(&self) -> Option<Chain> {
        self.direction.map(|d| d.origin_chain())
    }

    pub fn destination_chain(&self) -> Option<Chain> {
        self.direction.map(|d| d.destination_chain())
    }
}

impl From<&RouteQuote> for ArbitrageResult {
    fn from(quote: &RouteQuote) -> Self {
        Self {
            direction: Some(quote.direction),
            amount_in_usdc: quote.amount_in_usdc,
            amount_bridged_zerc: quote.amount_bridged_zerc,
            amount_out_usdc: quote.amount_out_usdc,
            profit_usdc: quote.profit_usdc,
        }
    }
}

// ------------------------------ Public entry ---------------------------------

/// Best trade for four reserves at the standard 0.3 % fee on both pools.
pub fn optimal_arbitrage(
    usdc_ethereum: Decimal,
    zerc_ethereum: Decimal,
    usdc_polygon: Decimal,
    zerc_polygon: Decimal,
) -> Result<ArbitrageResult> {
    let snapshot = ReserveSnapshot::new(usdc_ethereum, zerc_ethereum, usdc_polygon, zerc_polygon);
    optimize(&snapshot, &OptimizerSettings::default())
}

/// Optimize both directions and return the better one, or the no-trade result.
pub fn optimize(snapshot: &ReserveSnapshot, settings: &OptimizerSettings) -> Result<ArbitrageResult> {
    snapshot.validate()?;
    settings.fees.validate()?;

    let mut best: Option<RouteQuote> = None;
    for direction in ArbDirection::ALL {
        let (source, destination) = direction_pools(snapshot, direction, &settings.fees)?;
        let candidate = maximize_direction(direction, &source, &destination, settings)?;
        match &candidate {
            Some(q) => log::debug!(
                "{direction}: x* = {} USDC, profit = {} USDC",
                q.amount_in_usdc,
                q.profit_usdc
            ),
            None => log::debug!("{direction}: no profitable size"),
        }
        best = match (best, candidate) {
            (Some(b), Some(c)) => Some(if c.profit_usdc > b.profit_usdc { c } else { b }),
            (None, c) => c,
            (b, None) => b,
        };
    }

    Ok(best
        .as_ref()
        .map(ArbitrageResult::from)
        .unwrap_or_else(ArbitrageResult::no_trade))
}

// ------------------------------ Core maximize --------------------------------

/// Optimal route for one direction, or None when no size makes money.
pub fn maximize_direction(
    direction: ArbDirection,
    source: &Pool,
    destination: &Pool,
    settings: &OptimizerSettings,
) -> Result<Option<RouteQuote>> {
    source.ensure_swappable()?;
    destination.ensure_swappable()?;

    let x_star = match settings.method {
        SolveMethod::ClosedForm => {
            let solved = closed_form_input(source, destination);
            or_search_on_instability(direction, solved, source, destination, settings)?
        }
        SolveMethod::GoldenSection => search_input(source, destination, settings)?,
    };

    let Some(x) = x_star else {
        return Ok(None);
    };
    let quote = quote_route(direction, source, destination, x)?;
    Ok((quote.profit_usdc > Decimal::ZERO).then_some(quote))
}

/// Passes a closed-form answer through, or searches when the root was rejected.
fn or_search_on_instability(
    direction: ArbDirection,
    solved: Result<Option<Decimal>>,
    source: &Pool,
    destination: &Pool,
    settings: &OptimizerSettings,
) -> Result<Option<Decimal>> {
    match solved {
        Err(ArbError::NumericInstability(reason)) => {
            log::warn!("{direction}: {reason}; falling back to golden-section search");
            search_input(source, destination, settings)
        }
        other => other,
    }
}

#[inline]
fn route_profit(source: &Pool, destination: &Pool, amount_in: Decimal) -> Result<Decimal> {
    let bridged = source.quote_out(amount_in)?;
    Ok(destination.quote_out(bridged)? - amount_in)
}

// ------------------------------- Closed form ---------------------------------

/// x* = (sqrt(A B) - B) / C on integers.
///
/// Every input is lifted to a common scale k, so with integer reserves and γs:
///   A > B  <=>  g1 g2 b1 b2 > a1 a2 k^2
///   x*     =   (sqrt(g1 g2 b1 b2 a1 a2) - a1 a2 k) / (g1 (a2 k + g2 b1))
/// The root is taken of the radicand times 10^(2 * MAX_SCALE) so the quotient keeps
/// MAX_SCALE fractional digits before it is brought back to a Decimal.
///
/// Ok(None): no profitable size. Err(NumericInstability): the root failed its checks.
pub(crate) fn closed_form_input(source: &Pool, destination: &Pool) -> Result<Option<Decimal>> {
    let gamma_src = Decimal::ONE - source.fee_rate;
    let gamma_dst = Decimal::ONE - destination.fee_rate;
    let values = [
        source.reserve_in,
        source.reserve_out,
        destination.reserve_in,
        destination.reserve_out,
        gamma_src,
        gamma_dst,
    ];
    let scale = common_scale(&values);
    let k = pow10(scale);
    let [a1, b1, a2, b2, g1, g2] = values.map(|v| to_scaled_int(v, scale));

    let gross: BigInt = &g1 * &g2 * &b1 * &b2;
    let pool_product: BigInt = &a1 * &a2;
    if gross <= &pool_product * &k * &k {
        return Ok(None);
    }

    let lift = pow10(MAX_SCALE);
    let radicand: BigInt = &gross * &pool_product * &lift * &lift;
    let numerator: BigInt = Roots::sqrt(&radicand) - &pool_product * &k * &lift;
    let denominator: BigInt = &g1 * (&a2 * &k + &g2 * &b1);

    if denominator.is_zero() {
        return Err(ArbError::NumericInstability("zero denominator".to_string()));
    }
    if !numerator.is_positive() {
        return Err(ArbError::NumericInstability(format!(
            "root numerator {numerator} outside [0, inf)"
        )));
    }

    let x = from_scaled_int(&(numerator / denominator), MAX_SCALE, "optimal input")?;
    if x.is_zero() {
        return Err(ArbError::NumericInstability(
            "optimal input below decimal resolution".to_string(),
        ));
    }
    let profit = route_profit(source, destination, x)?;
    if profit <= Decimal::ZERO {
        return Err(ArbError::NumericInstability(format!(
            "profit {profit} at root {x} despite positive marginal profit at zero"
        )));
    }
    Ok(Some(x))
}

// -------------------------- Bracket + golden search --------------------------

fn search_input(
    source: &Pool,
    destination: &Pool,
    settings: &OptimizerSettings,
) -> Result<Option<Decimal>> {
    let hint = (source.reserve_in / Decimal::ONE_THOUSAND).max(Decimal::new(1, MAX_SCALE));
    let (lo, hi) = bracket_profit(source, destination, hint, settings.max_iterations)?;
    let (x, p) = golden_search(source, destination, lo, hi, settings)?;
    log::debug!("golden-section: bracket [{lo}, {hi}] -> x = {x}, profit = {p}");
    Ok((p > Decimal::ZERO).then_some(x))
}

/// Interval holding the maximizer. P(0) = 0 and P is concave, so if P(hint) <= 0 the peak is
/// left of the hint; otherwise double until profit stops rising.
fn bracket_profit(
    source: &Pool,
    destination: &Pool,
    hint: Decimal,
    max_steps: u32,
) -> Result<(Decimal, Decimal)> {
    let mut lo = Decimal::ZERO;
    let mut mid = hint;
    let mut p_mid = route_profit(source, destination, mid)?;
    if p_mid <= Decimal::ZERO {
        return Ok((Decimal::ZERO, mid));
    }

    for _ in 0..max_steps {
        let Some(next) = mid.checked_mul(Decimal::TWO) else {
            break;
        };
        let p_next = route_profit(source, destination, next)?;
        if p_next <= p_mid {
            return Ok((lo, next));
        }
        lo = mid;
        mid = next;
        p_mid = p_next;
    }
    Ok((lo, mid))
}

fn golden_search(
    source: &Pool,
    destination: &Pool,
    mut a: Decimal,
    mut b: Decimal,
    settings: &OptimizerSettings,
) -> Result<(Decimal, Decimal)> {
    let inv_phi = inv_golden_ratio();
    let mut c = b - (b - a) * inv_phi;
    let mut d = a + (b - a) * inv_phi;
    let mut pc = route_profit(source, destination, c)?;
    let mut pd = route_profit(source, destination, d)?;

    for _ in 0..settings.max_iterations {
        if b - a <= settings.tolerance * b {
            break;
        }
        if pc > pd {
            b = d;
            d = c;
            pd = pc;
            c = b - (b - a) * inv_phi;
            pc = route_profit(source, destination, c)?;
        } else {
            a = c;
            c = d;
            pc = pd;
            d = a + (b - a) * inv_phi;
            pd = route_profit(source, destination, d)?;
        }
    }

    Ok(if pc > pd { (c, pc) } else { (d, pd) })
}

/// 1/φ ≈ 0.618.
#[inline]
fn inv_golden_ratio() -> Decimal {
    Decimal::from_i128_with_scale(618_033_988_749_894_848_204_586_834, 27)
}
