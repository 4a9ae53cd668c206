use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use providers::{config::ConfigLoader, db, seeds};

#[tokio::main]
async fn main() -> Result<()> {
    let loader = ConfigLoader::new();
    let config = loader.load().context("loading configuration")?;

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    Migrator::up(&db, None)
        .await
        .context("running pending migrations")?;

    seeds::seed_providers(&db)
        .await
        .context("seeding providers")?;

    println!("Provider fixtures seeded.");

    Ok(())
}
