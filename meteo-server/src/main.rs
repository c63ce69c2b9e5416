//! Server entry point: CLI arguments, tracing, wiring, bind-and-run.

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use meteo_server::config::AppConfig;
use meteo_server::state::AppState;
use meteo_server::{api, bootstrap, store};

#[derive(Debug, Parser)]
#[command(name = "meteo-server", version, about = "Weather lookup and favorites API")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "meteo.toml")]
    config: PathBuf,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;

    let pool = store::connect(&config.database.url).await?;
    bootstrap::ensure_admin(&pool, &config.admin).await?;

    let state = web::Data::new(AppState::from_config(&config, pool)?);

    info!(bind_addr = %config.server.bind_addr, "starting server");
    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(&config.server.bind_addr)
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?
        .run()
        .await?;

    Ok(())
}
