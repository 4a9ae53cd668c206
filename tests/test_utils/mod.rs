//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations for testing purposes.

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use providers::config::AppConfig;
use providers::lifecycle::{NewProvider, ProviderLifecycleService};
use providers::models::ProviderKind;
use providers::repositories::ProviderRepository;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// # Returns
///
/// Returns a Result containing the database connection
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    // Create in-memory SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    // Run all migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Sets up an in-memory SQLite database with all migrations applied and returns an Arc.
///
/// # Returns
///
/// Returns a Result containing an Arc-wrapped database connection
#[allow(dead_code)]
pub async fn setup_test_db_arc() -> Result<Arc<DatabaseConnection>> {
    let db = setup_test_db().await?;
    Ok(Arc::new(db))
}

/// Builds an application config suitable for tests.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        ..Default::default()
    }
}

/// Builds a lifecycle service over the given connection with the test config.
#[allow(dead_code)]
pub fn lifecycle_service(db: &DatabaseConnection) -> ProviderLifecycleService {
    let repo = ProviderRepository::new(Arc::new(db.clone()));
    ProviderLifecycleService::new(Arc::new(test_config()), repo)
}

/// Input for the n-th sample provider used across tests.
#[allow(dead_code)]
pub fn sample_input(n: usize) -> NewProvider {
    NewProvider {
        name: format!("Proveedor {}", n),
        email: format!("prov{}@test.com", n),
        phone: format!("60000000{}", n),
        kind: Some(ProviderKind::Hotel),
    }
}
