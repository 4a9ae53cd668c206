//! # CSV Export
//!
//! Accounting export of the active provider roster. The byte layout is fixed
//! by the downstream spreadsheet workflow: UTF-8 BOM, semicolon delimiter,
//! Spanish column headers, `DD/MM/YYYY HH:MM` registration dates.

use sea_orm::prelude::DateTimeWithTimeZone;

use crate::models::provider;
use crate::models::ProviderKind;

/// Byte-order mark so spreadsheet imports pick UTF-8 instead of Latin-1
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const CSV_HEADER: &str = "Nombre;Email;Teléfono;Tipo;Fecha de Registro";

/// Renders the export document for the given providers
///
/// Callers are expected to pass only active providers; this function renders
/// whatever it receives and applies no filtering of its own.
pub fn render_providers_csv(providers: &[provider::Model]) -> Vec<u8> {
    let mut out = Vec::with_capacity(UTF8_BOM.len() + CSV_HEADER.len() + providers.len() * 64);
    out.extend_from_slice(UTF8_BOM);
    out.extend_from_slice(CSV_HEADER.as_bytes());
    out.push(b'\n');

    for entry in providers {
        let fields = [
            escape_field(&entry.name),
            escape_field(&entry.email),
            escape_field(&entry.phone),
            escape_field(&kind_column(entry.kind.as_ref())),
            escape_field(&format_registration_date(&entry.created_at)),
        ];
        out.extend_from_slice(fields.join(";").as_bytes());
        out.push(b'\n');
    }

    out
}

/// Type column: stored value with its first character capitalized, empty when unset
fn kind_column(kind: Option<&ProviderKind>) -> String {
    match kind {
        Some(kind) => ucfirst(kind.as_str()),
        None => String::new(),
    }
}

fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_registration_date(created_at: &DateTimeWithTimeZone) -> String {
    created_at.format("%d/%m/%Y %H:%M").to_string()
}

/// Quote a field when it contains the delimiter, a quote or a line break;
/// embedded quotes are doubled
fn escape_field(field: &str) -> String {
    if field.contains(';') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
