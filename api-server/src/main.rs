mod api;
mod models;

use log::info;
use models::config::Config;
use models::context::{Context, ContextPointer};
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::path::Path;
use std::sync::Arc;

const CONFIG_ENV: &str = "ANIME_API_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub fn build_rocket(figment: Figment, context: ContextPointer) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(context)
        .mount("/api", api::routes())
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path =
        std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(Path::new(&config_path))?;

    TermLogger::init(
        config.log_level(),
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;
    info!("Loaded configuration from {}", config_path);

    let figment = rocket::Config::figment().merge(("port", config.port));
    let context = Arc::new(Context::new(config)?);

    build_rocket(figment, context).launch().await?;
    Ok(())
}
