use anyhow::Result;
use rust_decimal::Decimal;

use crate::config::Config;
use crate::engine::optimizer::OptimizerSettings;

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: OptimizerSettings,
    pub default_trade_size_usdc: Decimal,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let settings = config.optimizer_settings();
        settings.fees.validate()?;

        log::info!(
            "optimizer: {} (fees eth {} / pol {}, max {} iterations)",
            settings.method,
            settings.fees.ethereum,
            settings.fees.polygon,
            settings.max_iterations
        );

        Ok(AppState {
            settings,
            default_trade_size_usdc: config.default_trade_size_usdc,
        })
    }
}
