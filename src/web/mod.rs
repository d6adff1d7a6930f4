pub mod dto;
pub mod routes;

use std::sync::Arc;

use anyhow::Result;
use rocket::{routes, Build, Rocket};

use crate::bootstrap::AppState;
use crate::config::Config;
use routes::{arbitrage_opportunity, health, optimal_arbitrage_opportunity};

/// Rocket instance with state and routes mounted; `main` and the API tests share it.
pub fn build_rocket(config: &Config) -> Result<Rocket<Build>> {
    let app_state = Arc::new(AppState::new(config)?);

    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    Ok(rocket::custom(figment)
        .manage(app_state)
        .mount("/", routes![arbitrage_opportunity, optimal_arbitrage_opportunity, health]))
}
