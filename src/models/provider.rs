//! Provider entity model
//!
//! This module contains the SeaORM entity model for the providers table,
//! the catalog of travel-package suppliers managed by this service.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Provider entity representing a travel-package supplier
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    /// Storage-assigned identifier, immutable once assigned
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Supplier name, unique among active providers
    pub name: String,

    /// Contact email, unique among active providers
    pub email: String,

    /// Contact phone, at most 20 characters
    pub phone: String,

    /// Kind of supplier (hotel, cruise line, ski resort, theme park)
    #[sea_orm(column_name = "type")]
    pub kind: Option<ProviderKind>,

    /// False once the provider has been soft-deleted
    pub active: bool,

    /// Timestamp when the provider was created, never modified afterwards
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp of the last mutation
    pub updated_at: DateTimeWithTimeZone,
}

/// Kind of travel-package supplier, stored as a lowercase string
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ProviderKind {
    #[sea_orm(string_value = "hotel")]
    #[serde(rename = "hotel")]
    Hotel,

    #[sea_orm(string_value = "crucero")]
    #[serde(rename = "crucero")]
    Crucero,

    #[sea_orm(string_value = "esqui")]
    #[serde(rename = "esqui")]
    Esqui,

    #[sea_orm(string_value = "parque")]
    #[serde(rename = "parque")]
    Parque,
}

impl ProviderKind {
    /// Stored string value of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Hotel => "hotel",
            ProviderKind::Crucero => "crucero",
            ProviderKind::Esqui => "esqui",
            ProviderKind::Parque => "parque",
        }
    }

    /// Human-readable Spanish label used by the form views
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Hotel => "Hotel",
            ProviderKind::Crucero => "Crucero",
            ProviderKind::Esqui => "Estación de esquí",
            ProviderKind::Parque => "Parque temático",
        }
    }

    /// Parses a stored/submitted value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hotel" => Some(ProviderKind::Hotel),
            "crucero" => Some(ProviderKind::Crucero),
            "esqui" => Some(ProviderKind::Esqui),
            "parque" => Some(ProviderKind::Parque),
            _ => None,
        }
    }

    /// All kinds, in the order the form view lists them
    pub fn all() -> [ProviderKind; 4] {
        [
            ProviderKind::Hotel,
            ProviderKind::Crucero,
            ProviderKind::Esqui,
            ProviderKind::Parque,
        ]
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_round_trip() {
        for kind in ProviderKind::all() {
            assert_eq!(ProviderKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ProviderKind::parse("balneario"), None);
        assert_eq!(ProviderKind::parse(""), None);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ProviderKind::Hotel.label(), "Hotel");
        assert_eq!(ProviderKind::Esqui.label(), "Estación de esquí");
        assert_eq!(ProviderKind::Parque.label(), "Parque temático");
    }
}
