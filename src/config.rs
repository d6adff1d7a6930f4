use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;

use crate::engine::optimizer::{FeeSchedule, OptimizerSettings, SolveMethod};
use crate::math::constant_product::{validate_fee, STANDARD_FEE_RATE};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,

    // Pool fees
    pub ethereum_pool_fee_rate: Decimal,
    pub polygon_pool_fee_rate: Decimal,

    // Optimizer
    pub optimizer_method: SolveMethod,
    pub optimizer_max_iterations: u32,
    pub optimizer_tolerance: Decimal,

    /// Size used by the fixed-size endpoint when the caller gives none.
    pub default_trade_size_usdc: Decimal,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Public config first, then a local override
        dotenv::from_filename("config/arbitrage.env").ok();
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Missing keys take their defaults; present but
    /// malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ethereum_pool_fee_rate = parse_or(&lookup, "ETHEREUM_POOL_FEE_RATE", STANDARD_FEE_RATE)?;
        let polygon_pool_fee_rate = parse_or(&lookup, "POLYGON_POOL_FEE_RATE", STANDARD_FEE_RATE)?;
        validate_fee(ethereum_pool_fee_rate).context("ETHEREUM_POOL_FEE_RATE")?;
        validate_fee(polygon_pool_fee_rate).context("POLYGON_POOL_FEE_RATE")?;

        let optimizer_method = match lookup("OPTIMIZER_METHOD") {
            Some(raw) => raw
                .parse::<SolveMethod>()
                .map_err(|e| anyhow!("OPTIMIZER_METHOD: {e}"))?,
            None => SolveMethod::ClosedForm,
        };

        let optimizer_max_iterations: u32 = parse_or(&lookup, "OPTIMIZER_MAX_ITERATIONS", 256)?;
        if optimizer_max_iterations == 0 {
            return Err(anyhow!("OPTIMIZER_MAX_ITERATIONS must be at least 1"));
        }

        let optimizer_tolerance = parse_or(&lookup, "OPTIMIZER_TOLERANCE", Decimal::new(1, 12))?;
        if optimizer_tolerance <= Decimal::ZERO {
            return Err(anyhow!("OPTIMIZER_TOLERANCE must be positive, got {optimizer_tolerance}"));
        }

        let default_trade_size_usdc = parse_or(&lookup, "DEFAULT_TRADE_SIZE_USDC", Decimal::ONE_THOUSAND)?;
        if default_trade_size_usdc < Decimal::ZERO {
            return Err(anyhow!(
                "DEFAULT_TRADE_SIZE_USDC must not be negative, got {default_trade_size_usdc}"
            ));
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8000)?,
            ethereum_pool_fee_rate,
            polygon_pool_fee_rate,
            optimizer_method,
            optimizer_max_iterations,
            optimizer_tolerance,
            default_trade_size_usdc,
        })
    }

    pub fn optimizer_settings(&self) -> OptimizerSettings {
        OptimizerSettings {
            fees: FeeSchedule {
                ethereum: self.ethereum_pool_fee_rate,
                polygon: self.polygon_pool_fee_rate,
            },
            method: self.optimizer_method,
            max_iterations: self.optimizer_max_iterations,
            tolerance: self.optimizer_tolerance,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{key}: cannot parse '{raw}': {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.ethereum_pool_fee_rate, STANDARD_FEE_RATE);
        assert_eq!(config.optimizer_method, SolveMethod::ClosedForm);
        assert_eq!(config.default_trade_size_usdc, Decimal::ONE_THOUSAND);
        assert_eq!(config.optimizer_settings(), OptimizerSettings::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("PORT", "9100"),
            ("POLYGON_POOL_FEE_RATE", "0.0005"),
            ("OPTIMIZER_METHOD", "golden-section"),
            ("OPTIMIZER_MAX_ITERATIONS", "64"),
        ])
        .unwrap();
        assert_eq!(config.port, 9100);
        let settings = config.optimizer_settings();
        assert_eq!(settings.fees.polygon, Decimal::new(5, 4));
        assert_eq!(settings.fees.ethereum, STANDARD_FEE_RATE);
        assert_eq!(settings.method, SolveMethod::GoldenSection);
        assert_eq!(settings.max_iterations, 64);
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("ETHEREUM_POOL_FEE_RATE", "1")]).is_err());
        assert!(config_from(&[("OPTIMIZER_METHOD", "bisection")]).is_err());
        assert!(config_from(&[("OPTIMIZER_MAX_ITERATIONS", "0")]).is_err());
        assert!(config_from(&[("OPTIMIZER_TOLERANCE", "-0.1")]).is_err());
        assert!(config_from(&[("DEFAULT_TRADE_SIZE_USDC", "-5")]).is_err());
    }
}
