use rocket::launch;

use zerc_bridge_arbitrage::{config, web};

#[launch]
fn rocket() -> _ {
    env_logger::init();

    // Load configuration
    let config = config::Config::from_env()
        .expect("Failed to load configuration");

    web::build_rocket(&config)
        .expect("Failed to initialize application state")
}
