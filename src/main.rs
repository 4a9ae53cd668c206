//! # Providers API Main Entry Point
//!
//! This is the main entry point for the Providers API service.

use migration::{Migrator, MigratorTrait};
use providers::{config::ConfigLoader, db::init_pool, seeds, server::run_server, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    // Log the loaded configuration with secrets redacted
    println!("Loaded configuration for profile: {}", config.profile);
    if let Ok(redacted_json) = config.redacted_json() {
        println!("Configuration: {}", redacted_json);
    }

    telemetry::init_tracing(&config)?;

    let db = init_pool(&config).await?;
    Migrator::up(&db, None).await?;

    if config.seed_on_start {
        seeds::seed_providers(&db).await?;
    }

    // Start the server with the loaded configuration
    run_server(config, db).await
}
