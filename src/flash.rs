//! # Flash Messages
//!
//! One-time notification keys that survive exactly one redirect. The key is
//! an opaque i18n identifier (`flash.created`, `flash.updated`, ...) carried
//! in a short-lived cookie and cleared when the list view consumes it.

use axum_extra::extract::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

/// Cookie name for the pending flash message
pub const FLASH_COOKIE_NAME: &str = "providers_flash";

/// An unconsumed flash expires on its own after this many seconds
const FLASH_COOKIE_MAX_AGE_SECS: u64 = 300;

/// Rendering category for a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Warning,
    Danger,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Warning => "warning",
            FlashCategory::Danger => "danger",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(FlashCategory::Success),
            "warning" => Some(FlashCategory::Warning),
            "danger" => Some(FlashCategory::Danger),
            _ => None,
        }
    }
}

/// A one-time notification: category plus opaque translation key
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FlashMessage {
    pub category: FlashCategory,
    pub key: String,
}

impl FlashMessage {
    pub fn created() -> Self {
        Self {
            category: FlashCategory::Success,
            key: "flash.created".to_string(),
        }
    }

    pub fn updated() -> Self {
        Self {
            category: FlashCategory::Success,
            key: "flash.updated".to_string(),
        }
    }

    pub fn deleted() -> Self {
        Self {
            category: FlashCategory::Warning,
            key: "flash.deleted".to_string(),
        }
    }

    pub fn error_generic() -> Self {
        Self {
            category: FlashCategory::Danger,
            key: "flash.error_generic".to_string(),
        }
    }

    /// Cookie wire form. Both halves are valid cookie-value octets, so no
    /// further encoding is needed.
    fn encode(&self) -> String {
        format!("{}:{}", self.category.as_str(), self.key)
    }

    fn decode(raw: &str) -> Option<Self> {
        let (category, key) = raw.split_once(':')?;
        if key.is_empty() {
            return None;
        }
        Some(Self {
            category: FlashCategory::parse(category)?,
            key: key.to_string(),
        })
    }
}

/// Create a Set-Cookie header value carrying the flash across one redirect
pub fn create_flash_cookie(message: &FlashMessage) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        FLASH_COOKIE_NAME,
        message.encode(),
        FLASH_COOKIE_MAX_AGE_SECS
    )
}

/// Create a Set-Cookie header value that clears a consumed flash
pub fn clear_flash_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        FLASH_COOKIE_NAME
    )
}

/// Read the pending flash from the request cookies, if any
///
/// Undecodable cookie payloads are treated as no flash rather than an error.
pub fn take_flash(jar: &CookieJar) -> Option<FlashMessage> {
    jar.get(FLASH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .and_then(|raw| FlashMessage::decode(&raw))
}
