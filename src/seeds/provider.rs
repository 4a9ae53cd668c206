//! Provider seeding functionality
//!
//! This module provides functionality to seed the providers table with
//! a development fixture set of travel suppliers.

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use sea_orm::{DatabaseConnection, Set};
use std::sync::Arc;

use crate::models::ProviderKind;
use crate::models::provider;
use crate::repositories::ProviderRepository;

/// Number of fixture providers created by a full seed run
const SEED_PROVIDER_COUNT: usize = 20;

/// Seeds the providers table with development fixtures
///
/// Each fixture is keyed by its email; rows that already exist are skipped,
/// so the seed can run repeatedly against the same database.
///
/// # Arguments
///
/// * `db` - Database connection
///
/// # Returns
///
/// Returns a Result indicating success or failure
pub async fn seed_providers(db: &DatabaseConnection) -> Result<()> {
    let repo = ProviderRepository::new(Arc::new(db.clone()));
    let kinds = ProviderKind::all();
    let mut rng = rand::thread_rng();

    for i in 0..SEED_PROVIDER_COUNT {
        let email = format!("prov{}@test.com", i);

        // Check if this fixture already exists
        match repo.find_by_email(&email).await {
            Ok(Some(_)) => {
                log::info!("Provider '{}' already exists, skipping", email);
                continue;
            }
            Ok(None) => {
                log::info!("Creating provider: {}", email);

                let now = Utc::now();
                let kind = kinds[rng.gen_range(0..kinds.len())];
                let draft = provider::ActiveModel {
                    name: Set(format!("Proveedor {}", i)),
                    email: Set(email.clone()),
                    phone: Set(format!("60000000{}", i)),
                    kind: Set(Some(kind)),
                    active: Set(true),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                    ..Default::default()
                };

                match repo.insert(draft).await {
                    Ok(_) => {
                        log::info!("Successfully created provider: {}", email);
                    }
                    Err(e) => {
                        log::error!("Failed to create provider '{}': {}", email, e);
                        return Err(e);
                    }
                }
            }
            Err(e) => {
                log::error!("Error checking if provider '{}' exists: {}", email, e);
                return Err(e);
            }
        }
    }

    log::info!("Provider seeding completed successfully");
    Ok(())
}
