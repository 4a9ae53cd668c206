//! # Provider Lifecycle
//!
//! This module owns the create, edit, soft-delete and export operations for
//! provider records. Deactivation never removes a row: it flips `active` off
//! and rewrites the unique fields with a deletion marker so the original
//! values become free for a future active provider.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use sea_orm::Set;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::csrf;
use crate::models::provider;
use crate::models::ProviderKind;
use crate::repositories::ProviderRepository;

/// Name suffix appended on soft delete, kept human-readable for audit views
const DELETED_NAME_SUFFIX: &str = " (Borrado)";

/// Original phone digits preserved ahead of the deletion marker
const PHONE_AUDIT_PREFIX_LEN: usize = 10;

/// Hard column limit on phone; the marker is truncated before violating it
const PHONE_MAX_LEN: usize = 20;

/// Validated field set for a new provider
#[derive(Debug, Clone)]
pub struct NewProvider {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub kind: Option<ProviderKind>,
}

/// Validated field set applied to an existing provider
///
/// `active` is an explicit toggle; `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct ProviderUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub kind: Option<ProviderKind>,
    pub active: Option<bool>,
}

/// Errors produced by lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Provider {id} not found")]
    NotFound { id: i32 },

    #[error("Delete token rejected for provider {id}")]
    TokenRejected { id: i32 },

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl LifecycleError {
    /// Whether the underlying failure is a unique-constraint violation on
    /// name, email or phone
    pub fn is_unique_violation(&self) -> bool {
        match self {
            LifecycleError::Persistence(err) => err
                .downcast_ref::<sea_orm::DbErr>()
                .is_some_and(crate::error::is_unique_violation),
            _ => false,
        }
    }
}

/// Service owning provider lifecycle operations and their invariants
#[derive(Debug, Clone)]
pub struct ProviderLifecycleService {
    config: Arc<AppConfig>,
    repo: ProviderRepository,
}

impl ProviderLifecycleService {
    /// Create a new lifecycle service instance
    pub fn new(config: Arc<AppConfig>, repo: ProviderRepository) -> Self {
        Self { config, repo }
    }

    /// Creates a provider from validated input
    ///
    /// New providers are always active and carry `created_at == updated_at`.
    #[instrument(skip_all)]
    pub async fn create(&self, input: NewProvider) -> Result<provider::Model, LifecycleError> {
        let now = Utc::now();

        let draft = provider::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            kind: Set(input.kind),
            active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let created = self.repo.insert(draft).await?;
        info!(provider_id = created.id, "Provider created");
        Ok(created)
    }

    /// Fetches a provider by id, failing with `NotFound` when absent
    pub async fn get(&self, id: i32) -> Result<provider::Model, LifecycleError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound { id })
    }

    /// Applies validated changes to an existing provider
    ///
    /// `created_at` is never touched; `updated_at` is restamped on every call.
    #[instrument(skip_all, fields(provider_id = id))]
    pub async fn edit(
        &self,
        id: i32,
        update: ProviderUpdate,
    ) -> Result<provider::Model, LifecycleError> {
        let existing = self.get(id).await?;

        let mut changes: provider::ActiveModel = existing.into();
        changes.name = Set(update.name);
        changes.email = Set(update.email);
        changes.phone = Set(update.phone);
        changes.kind = Set(update.kind);
        if let Some(active) = update.active {
            changes.active = Set(active);
        }
        changes.updated_at = Set(Utc::now().into());

        let updated = self.repo.update(changes).await?;
        info!(provider_id = updated.id, "Provider updated");
        Ok(updated)
    }

    /// Deactivates a provider after verifying the delete token
    ///
    /// A rejected token is surfaced as `TokenRejected`; no mutation happens.
    /// An already-inactive provider is deactivated again without complaint,
    /// which appends a fresh marker on top of the previous one.
    #[instrument(skip_all, fields(provider_id = id))]
    pub async fn soft_delete(
        &self,
        id: i32,
        provided_token: &str,
    ) -> Result<provider::Model, LifecycleError> {
        let existing = self.get(id).await?;

        if let Err(err) = csrf::verify_delete_token(id, provided_token, &self.config.csrf_secret) {
            warn!(provider_id = id, error = %err, "Delete token rejected");
            return Err(LifecycleError::TokenRejected { id });
        }

        let marker = deletion_marker();
        let mut changes: provider::ActiveModel = existing.clone().into();
        changes.active = Set(false);
        changes.name = Set(format!("{}{}", existing.name, DELETED_NAME_SUFFIX));
        changes.email = Set(format!("{}{}", existing.email, marker));
        changes.phone = Set(rewrite_phone_for_delete(&existing.phone, &marker));
        changes.updated_at = Set(Utc::now().into());

        let deleted = self.repo.update(changes).await?;
        info!(provider_id = deleted.id, "Provider deactivated");
        Ok(deleted)
    }

    /// Returns all active providers, ordering unspecified
    pub async fn list_active(&self) -> Result<Vec<provider::Model>, LifecycleError> {
        Ok(self.repo.find_active().await?)
    }

    /// Renders the accounting CSV for all active providers
    pub async fn export_active_csv(&self) -> Result<Vec<u8>, LifecycleError> {
        let active = self.list_active().await?;
        Ok(crate::export::render_providers_csv(&active))
    }
}

/// Generates a marker unique enough to free the row's email and phone
///
/// Epoch microseconds plus a random salt, rendered as lowercase hex.
fn deletion_marker() -> String {
    let micros = Utc::now().timestamp_micros().max(0);
    let salt: u16 = rand::thread_rng().gen_range(0..=u16::MAX);
    format!("-DEL-{:x}{:04x}", micros, salt)
}

/// Phone rewrite on delete: keep the leading digits for audit, append the
/// marker, then cut the whole string back to the column limit. The marker may
/// lose its tail; the length bound wins.
fn rewrite_phone_for_delete(phone: &str, marker: &str) -> String {
    let mut rewritten: String = phone.chars().take(PHONE_AUDIT_PREFIX_LEN).collect();
    rewritten.push_str(marker);
    rewritten.chars().take(PHONE_MAX_LEN).collect()
}
