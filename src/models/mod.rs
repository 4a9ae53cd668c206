//! # Data Models
//!
//! This module contains all the data models used throughout the Providers service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod provider;

pub use provider::Entity as Provider;
pub use provider::ProviderKind;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "providers".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
