// Constant-product (x*y=k) pool math
// ---------------------------------
// Uniswap V2 getAmountOut/getAmountIn with the fee taken off the input before the invariant
// is applied. Amounts are human-unit Decimals; nothing here touches a chain.
//
// A Pool is always oriented: `reserve_in` is the side being sold into the pool, `reserve_out`
// the side being bought. `reversed()` flips it for the opposite trade.

use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{ArbError, Result};

/// Standard V2 swap fee, 0.3 %.
pub const STANDARD_FEE_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 3);

// ------------------------------- Data types ----------------------------------

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pool {
    pub reserve_in: Decimal,
    pub reserve_out: Decimal,
    pub fee_rate: Decimal,
}

/// Reporting view of one exact-input swap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwapQuote {
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    /// tokenOut per tokenIn actually received.
    pub effective_price: Decimal,
    /// tokenOut per tokenIn at the margin, fee-free.
    pub spot_price: Decimal,
    /// Negative: execution worse than spot.
    pub price_impact_percent: Decimal,
}

impl Pool {
    /// Rejects negative reserves and fee rates outside [0, 1). Empty reserves are allowed
    /// here; swapping against them is what fails.
    pub fn new(reserve_in: Decimal, reserve_out: Decimal, fee_rate: Decimal) -> Result<Self> {
        if reserve_in < Decimal::ZERO {
            return Err(ArbError::invalid_reserve("reserve_in", reserve_in));
        }
        if reserve_out < Decimal::ZERO {
            return Err(ArbError::invalid_reserve("reserve_out", reserve_out));
        }
        validate_fee(fee_rate)?;
        Ok(Self { reserve_in, reserve_out, fee_rate })
    }

    pub fn with_standard_fee(reserve_in: Decimal, reserve_out: Decimal) -> Result<Self> {
        Self::new(reserve_in, reserve_out, STANDARD_FEE_RATE)
    }

    #[inline]
    pub fn reversed(&self) -> Self {
        Self {
            reserve_in: self.reserve_out,
            reserve_out: self.reserve_in,
            fee_rate: self.fee_rate,
        }
    }

    #[inline]
    pub fn quote_out(&self, amount_in: Decimal) -> Result<Decimal> {
        amount_out(amount_in, self.reserve_in, self.reserve_out, self.fee_rate)
    }

    #[inline]
    pub fn quote_in(&self, amount_out: Decimal) -> Result<Decimal> {
        amount_in(amount_out, self.reserve_in, self.reserve_out, self.fee_rate)
    }

    /// reserve_out / reserve_in.
    pub fn spot_price(&self) -> Result<Decimal> {
        check_reserves(self.reserve_in, self.reserve_out)?;
        self.reserve_out
            .checked_div(self.reserve_in)
            .ok_or(ArbError::NumericOverflow("spot price"))
    }

    /// Reserves after selling `amount_in` into the pool. The fee stays in the pool, so the
    /// full input is added on the in side.
    pub fn after_swap(&self, amount_in: Decimal) -> Result<Self> {
        let out = self.quote_out(amount_in)?;
        Ok(Self {
            reserve_in: self
                .reserve_in
                .checked_add(amount_in)
                .ok_or(ArbError::NumericOverflow("post-swap reserve"))?,
            reserve_out: self.reserve_out - out,
            fee_rate: self.fee_rate,
        })
    }

    /// Both reserves positive and a valid fee.
    pub fn ensure_swappable(&self) -> Result<()> {
        check_reserves(self.reserve_in, self.reserve_out)?;
        validate_fee(self.fee_rate)
    }

    #[inline]
    pub fn invariant(&self) -> Option<Decimal> {
        self.reserve_in.checked_mul(self.reserve_out)
    }
}

// ------------------------------- Core math -----------------------------------

/// out = (in * γ * R_out) / (R_in + in * γ), γ = 1 - fee.
pub fn amount_out(
    amount_in: Decimal,
    reserve_in: Decimal,
    reserve_out: Decimal,
    fee_rate: Decimal,
) -> Result<Decimal> {
    check_reserves(reserve_in, reserve_out)?;
    if amount_in < Decimal::ZERO {
        return Err(ArbError::InvalidAmount(amount_in));
    }
    validate_fee(fee_rate)?;
    if amount_in.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let in_after_fee = amount_in
        .checked_mul(Decimal::ONE - fee_rate)
        .ok_or(ArbError::NumericOverflow("fee deduction"))?;
    let denominator = reserve_in
        .checked_add(in_after_fee)
        .ok_or(ArbError::NumericOverflow("swap denominator"))?;

    // Multiply first for precision; very large raw-unit reserves overflow the 96-bit
    // mantissa, so fall back to the share of the pool being taken.
    match reserve_out.checked_mul(in_after_fee) {
        Some(numerator) => numerator
            .checked_div(denominator)
            .ok_or(ArbError::NumericOverflow("swap output")),
        None => in_after_fee
            .checked_div(denominator)
            .and_then(|share| share.checked_mul(reserve_out))
            .ok_or(ArbError::NumericOverflow("swap output")),
    }
}

/// Exact-output inverse: in = R_in * out / ((R_out - out) * γ).
pub fn amount_in(
    amount_out: Decimal,
    reserve_in: Decimal,
    reserve_out: Decimal,
    fee_rate: Decimal,
) -> Result<Decimal> {
    check_reserves(reserve_in, reserve_out)?;
    if amount_out < Decimal::ZERO {
        return Err(ArbError::InvalidAmount(amount_out));
    }
    validate_fee(fee_rate)?;
    if amount_out.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if amount_out >= reserve_out {
        return Err(ArbError::InsufficientLiquidity {
            requested: amount_out,
            available: reserve_out,
        });
    }

    let denominator = (reserve_out - amount_out)
        .checked_mul(Decimal::ONE - fee_rate)
        .ok_or(ArbError::NumericOverflow("inverse swap denominator"))?;
    match reserve_in.checked_mul(amount_out) {
        Some(numerator) => numerator
            .checked_div(denominator)
            .ok_or(ArbError::NumericOverflow("inverse swap input")),
        None => amount_out
            .checked_div(denominator)
            .and_then(|ratio| ratio.checked_mul(reserve_in))
            .ok_or(ArbError::NumericOverflow("inverse swap input")),
    }
}

/// Exact-input swap with price reporting.
pub fn simulate_exact_in(pool: &Pool, amount_in: Decimal) -> Result<SwapQuote> {
    let amount_out = pool.quote_out(amount_in)?;
    let spot_price = pool.spot_price()?;
    let effective_price = if amount_in.is_zero() {
        Decimal::ZERO
    } else {
        amount_out
            .checked_div(amount_in)
            .ok_or(ArbError::NumericOverflow("effective price"))?
    };
    let price_impact_percent = if spot_price.is_zero() || amount_in.is_zero() {
        Decimal::ZERO
    } else {
        effective_price
            .checked_div(spot_price)
            .and_then(|ratio| (ratio - Decimal::ONE).checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(ArbError::NumericOverflow("price impact"))?
    };
    Ok(SwapQuote {
        amount_in,
        amount_out,
        effective_price,
        spot_price,
        price_impact_percent,
    })
}

// ------------------------------ Validation -----------------------------------

fn check_reserves(reserve_in: Decimal, reserve_out: Decimal) -> Result<()> {
    if reserve_in <= Decimal::ZERO {
        return Err(ArbError::invalid_reserve("reserve_in", reserve_in));
    }
    if reserve_out <= Decimal::ZERO {
        return Err(ArbError::invalid_reserve("reserve_out", reserve_out));
    }
    Ok(())
}

pub fn validate_fee(fee_rate: Decimal) -> Result<()> {
    if fee_rate < Decimal::ZERO || fee_rate >= Decimal::ONE {
        return Err(ArbError::InvalidFee(fee_rate));
    }
    Ok(())
}

// ---------------------------------- Tests ------------------------------------
