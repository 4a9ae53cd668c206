//! Provider repository for database operations
//!
//! This module provides the ProviderRepository struct which encapsulates
//! SeaORM operations for the providers table.

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use std::sync::Arc;

use crate::models::provider::{self, Entity as Provider};

/// Repository for provider database operations
#[derive(Debug, Clone)]
pub struct ProviderRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl ProviderRepository {
    /// Creates a new ProviderRepository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Finds a provider by its numeric id
    ///
    /// # Arguments
    ///
    /// * `id` - The primary key of the provider
    ///
    /// # Returns
    ///
    /// Returns a Result containing the provider model if found, or an error
    pub async fn find_by_id(&self, id: i32) -> Result<Option<provider::Model>> {
        let found = Provider::find_by_id(id).one(&*self.db).await?;
        Ok(found)
    }

    /// Finds a provider by its email address
    pub async fn find_by_email(&self, email: &str) -> Result<Option<provider::Model>> {
        let found = Provider::find()
            .filter(provider::Column::Email.eq(email))
            .one(&*self.db)
            .await?;
        Ok(found)
    }

    /// Finds all providers still marked active
    ///
    /// No ordering is applied; callers needing a stable order must sort.
    pub async fn find_active(&self) -> Result<Vec<provider::Model>> {
        let providers = Provider::find()
            .filter(provider::Column::Active.eq(true))
            .all(&*self.db)
            .await?;
        Ok(providers)
    }

    /// Finds all providers, active and soft-deleted alike
    pub async fn find_all(&self) -> Result<Vec<provider::Model>> {
        let providers = Provider::find().all(&*self.db).await?;
        Ok(providers)
    }

    /// Inserts a new provider
    ///
    /// # Arguments
    ///
    /// * `provider` - The active model representing the provider to create
    ///
    /// # Returns
    ///
    /// Returns a Result containing the created provider model
    pub async fn insert(&self, provider: provider::ActiveModel) -> Result<provider::Model> {
        let created = provider.insert(&*self.db).await?;
        Ok(created)
    }

    /// Writes back a mutated provider
    pub async fn update(&self, provider: provider::ActiveModel) -> Result<provider::Model> {
        let updated = provider.update(&*self.db).await?;
        Ok(updated)
    }
}
