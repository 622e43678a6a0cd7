use std::sync::Arc;

use anyhow::{format_err, Result};
use log::info;
use rocket_cors::CorsOptions;

use ua_forge::routes::{self, AppState};
use ua_forge::store::SupabaseClient;
use ua_forge::{SynthConfig, Synthesizer};

#[rocket::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = SynthConfig::from_env()?;
    info!("Synth config: {config:?}");

    let store = Arc::new(SupabaseClient::from_env()?);
    let state = AppState::new(store, Synthesizer::new(config)?);

    let cors = CorsOptions::default()
        .to_cors()
        .map_err(|e| format_err!("Invalid CORS options: {e}"))?;

    rocket::build()
        .attach(routes::stage(state))
        .attach(cors)
        .launch()
        .await
        .map_err(|e| format_err!("Rocket failed: {e}"))?;

    Ok(())
}
