use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{ArbError, Result};
use crate::math::fixed_point::from_raw;

pub const USDC_DECIMALS: u8 = 6;
/// Used when a token does not answer `decimals()`.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Polygon,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "Ethereum"),
            Chain::Polygon => write!(f, "Polygon"),
        }
    }
}

/// Human-unit reserves of the USDC/ZERC pool on each chain, as read at one moment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub usdc_ethereum: Decimal,
    pub zerc_ethereum: Decimal,
    pub usdc_polygon: Decimal,
    pub zerc_polygon: Decimal,
}

impl ReserveSnapshot {
    pub fn new(
        usdc_ethereum: Decimal,
        zerc_ethereum: Decimal,
        usdc_polygon: Decimal,
        zerc_polygon: Decimal,
    ) -> Self {
        Self { usdc_ethereum, zerc_ethereum, usdc_polygon, zerc_polygon }
    }

    /// Every reserve must be strictly positive: both pools are swapped against in either
    /// direction.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("usdc_ethereum", self.usdc_ethereum),
            ("zerc_ethereum", self.zerc_ethereum),
            ("usdc_polygon", self.usdc_polygon),
            ("zerc_polygon", self.zerc_polygon),
        ];
        for (name, value) in named {
            if value <= Decimal::ZERO {
                return Err(ArbError::invalid_reserve(name, value));
            }
        }
        Ok(())
    }

    pub fn usdc(&self, chain: Chain) -> Decimal {
        match chain {
            Chain::Ethereum => self.usdc_ethereum,
            Chain::Polygon => self.usdc_polygon,
        }
    }

    pub fn zerc(&self, chain: Chain) -> Decimal {
        match chain {
            Chain::Ethereum => self.zerc_ethereum,
            Chain::Polygon => self.zerc_polygon,
        }
    }

    /// The same two pools with their chains exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            usdc_ethereum: self.usdc_polygon,
            zerc_ethereum: self.zerc_polygon,
            usdc_polygon: self.usdc_ethereum,
            zerc_polygon: self.zerc_ethereum,
        }
    }

    pub fn from_raw_pairs(ethereum: &RawPairReserves, polygon: &RawPairReserves) -> Result<Self> {
        let (usdc_ethereum, zerc_ethereum) = ethereum.normalized()?;
        let (usdc_polygon, zerc_polygon) = polygon.normalized()?;
        Ok(Self { usdc_ethereum, zerc_ethereum, usdc_polygon, zerc_polygon })
    }
}

/// `getReserves()` output in token order, with the metadata needed to read it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawPairReserves {
    pub reserve0: u128,
    pub reserve1: u128,
    pub decimals0: u8,
    pub decimals1: u8,
    pub token0_is_usdc: bool,
}

impl RawPairReserves {
    /// USDC at 6 decimals, ZERC at the 18-decimal default.
    pub fn usdc_zerc(reserve0: u128, reserve1: u128, token0_is_usdc: bool) -> Self {
        let (decimals0, decimals1) = if token0_is_usdc {
            (USDC_DECIMALS, DEFAULT_TOKEN_DECIMALS)
        } else {
            (DEFAULT_TOKEN_DECIMALS, USDC_DECIMALS)
        };
        Self { reserve0, reserve1, decimals0, decimals1, token0_is_usdc }
    }

    /// (usdc, zerc) in human units.
    pub fn normalized(&self) -> Result<(Decimal, Decimal)> {
        let amount0 = from_raw(self.reserve0, self.decimals0)?;
        let amount1 = from_raw(self.reserve1, self.decimals1)?;
        if self.token0_is_usdc {
            Ok((amount0, amount1))
        } else {
            Ok((amount1, amount0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).expect("valid decimal literal")
    }

    #[test]
    fn validate_names_the_offending_reserve() {
        let snapshot = ReserveSnapshot::new(d("1"), d("1"), Decimal::ZERO, d("1"));
        assert_eq!(
            snapshot.validate(),
            Err(ArbError::invalid_reserve("usdc_polygon", Decimal::ZERO))
        );
        let negative = ReserveSnapshot::new(d("1"), d("-3"), d("1"), d("1"));
        assert_eq!(
            negative.validate(),
            Err(ArbError::invalid_reserve("zerc_ethereum", d("-3")))
        );
        assert!(ReserveSnapshot::new(d("1"), d("2"), d("3"), d("4")).validate().is_ok());
    }

    #[test]
    fn swapped_exchanges_chains() {
        let snapshot = ReserveSnapshot::new(d("1"), d("2"), d("3"), d("4"));
        let swapped = snapshot.swapped();
        assert_eq!(swapped.usdc(Chain::Ethereum), d("3"));
        assert_eq!(swapped.zerc(Chain::Polygon), d("2"));
        assert_eq!(swapped.swapped(), snapshot);
    }

    #[test]
    fn raw_reserves_follow_token_order() {
        // token0 = USDC (6), token1 = ZERC (18)
        let eth = RawPairReserves::usdc_zerc(1_000_000_000_000, 500_000_000_000_000_000_000_000, true);
        // token0 = ZERC (18), token1 = USDC (6)
        let pol = RawPairReserves::usdc_zerc(600_000_000_000_000_000_000_000, 1_000_000_000_000, false);
        let snapshot = ReserveSnapshot::from_raw_pairs(&eth, &pol).unwrap();
        assert_eq!(snapshot, ReserveSnapshot::new(d("1000000"), d("500000"), d("1000000"), d("600000")));
    }

    #[test]
    fn chain_names() {
        assert_eq!(Chain::Ethereum.to_string(), "Ethereum");
        assert_eq!(serde_json::to_string(&Chain::Polygon).unwrap(), "\"polygon\"");
    }
}
