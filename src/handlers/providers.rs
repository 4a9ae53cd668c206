//! # Providers API Handlers
//!
//! This module contains handlers for the provider listing, form, lifecycle
//! and CSV export endpoints, including the locale-prefixed routing and the
//! flash cookie carried across redirects.

use std::sync::Arc;

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::csrf;
use crate::error::{self, ApiError};
use crate::flash::{self, FlashMessage};
use crate::lifecycle::{LifecycleError, NewProvider, ProviderLifecycleService, ProviderUpdate};
use crate::models::ProviderKind;
use crate::models::provider;
use crate::repositories::ProviderRepository;
use crate::server::AppState;

/// Filename offered for the accounting export download
const EXPORT_FILENAME: &str = "proveedores_contabilidad.csv";

/// Request payload for creating a provider
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProviderRequestDto {
    /// Display name (required, max 255 characters)
    #[schema(example = "Hoteles Costa Brava")]
    pub name: String,
    /// Contact email (required, max 255 characters, must be a valid address)
    #[schema(example = "reservas@costabrava.example")]
    pub email: String,
    /// Contact phone (required, max 20 characters)
    #[schema(example = "+34600111222")]
    pub phone: String,
    /// Provider type, one of `hotel`, `crucero`, `esqui`, `parque` (optional)
    #[serde(rename = "type")]
    #[schema(example = "hotel")]
    pub kind: Option<String>,
}

/// Request payload for editing a provider
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProviderRequestDto {
    /// Display name (required, max 255 characters)
    pub name: String,
    /// Contact email (required, max 255 characters, must be a valid address)
    pub email: String,
    /// Contact phone (required, max 20 characters)
    pub phone: String,
    /// Provider type, one of `hotel`, `crucero`, `esqui`, `parque` (optional)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Explicit active toggle; omit to keep the stored value
    pub active: Option<bool>,
}

/// Request payload for the token-gated delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteProviderRequestDto {
    /// Delete token issued alongside the provider row
    #[serde(rename = "_token")]
    pub token: String,
}

/// A provider as rendered to API consumers
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderDto {
    /// Numeric identifier
    #[schema(example = 42)]
    pub id: i32,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Provider type (absent when unset)
    #[serde(rename = "type")]
    pub kind: Option<ProviderKind>,
    /// Whether the provider is still active
    pub active: bool,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last mutation timestamp (ISO 8601)
    pub updated_at: String,
    /// Token required to delete this provider
    pub delete_token: String,
}

/// Listing payload for one locale
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderListDto {
    /// Locale the listing was requested under
    #[schema(example = "es")]
    pub locale: String,
    /// Active providers, ordering unspecified
    pub providers: Vec<ProviderDto>,
    /// Pending one-time notification consumed by this render
    #[serde(skip_deserializing)]
    pub flash: Option<FlashMessage>,
}

/// One selectable provider type choice
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KindChoiceDto {
    /// Stored value
    pub value: ProviderKind,
    /// Spanish display label
    #[schema(example = "Estación de esquí")]
    pub label: String,
}

/// Descriptor a client needs to render the create or edit form
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderFormDescriptor {
    /// Where the form submits to
    #[schema(example = "/es/provider/new")]
    pub action: String,
    /// Submit method
    #[schema(example = "POST")]
    pub method: String,
    /// Selectable provider types
    pub kind_choices: Vec<KindChoiceDto>,
    /// Current values when editing an existing provider
    pub values: Option<ProviderDto>,
}

/// Standard API response wrapper for provider operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response metadata
    pub meta: ProviderResponseMeta,
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderResponseMeta {
    /// Unique request identifier for tracing
    #[schema(example = "1d2ad982-6a2a-4fc5-9a29-7a54f14abc11")]
    pub request_id: String,
    /// Response timestamp (ISO 8601)
    #[schema(example = "2026-01-15T10:30:00Z")]
    pub timestamp: String,
}

impl<T> ProviderApiResponse<T> {
    fn wrap(data: T) -> Self {
        Self {
            data,
            meta: ProviderResponseMeta {
                request_id: Uuid::new_v4().to_string(),
                timestamp: Utc::now().to_rfc3339(),
            },
        }
    }
}

fn lifecycle_service(state: &AppState) -> ProviderLifecycleService {
    let repo = ProviderRepository::new(Arc::new(state.db.clone()));
    ProviderLifecycleService::new(state.config.clone(), repo)
}

fn provider_list_path(locale: &str) -> String {
    format!("/{}/provider", locale)
}

fn ensure_supported_locale(config: &AppConfig, locale: &str) -> Result<(), ApiError> {
    if config.is_supported_locale(locale) {
        return Ok(());
    }
    Err(error::not_found(Some("Unsupported locale")).with_details(json!({ "locale": locale })))
}

fn provider_dto(model: &provider::Model, secret: &str) -> Result<ProviderDto, ApiError> {
    let delete_token = csrf::issue_delete_token(model.id, secret).map_err(|e| {
        tracing::error!(provider_id = model.id, error = %e, "Failed to issue delete token");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "Failed to issue delete token",
        )
    })?;

    Ok(ProviderDto {
        id: model.id,
        name: model.name.clone(),
        email: model.email.clone(),
        phone: model.phone.clone(),
        kind: model.kind,
        active: model.active,
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
        delete_token,
    })
}

fn kind_choices() -> Vec<KindChoiceDto> {
    ProviderKind::all()
        .iter()
        .map(|kind| KindChoiceDto {
            value: *kind,
            label: kind.label().to_string(),
        })
        .collect()
}

/// Validates the shared provider field set, first failure wins
fn validate_provider_fields(name: &str, email: &str, phone: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(error::validation_error(
            "Provider name is required and cannot be empty",
            json!({ "field": "name", "message": "Name must be provided and cannot be empty" }),
        ));
    }

    if name.chars().count() > 255 {
        return Err(error::validation_error(
            "Provider name exceeds maximum length",
            json!({
                "field": "name",
                "message": "Name cannot exceed 255 characters",
                "max_length": 255,
                "actual_length": name.chars().count()
            }),
        ));
    }

    if email.trim().is_empty() {
        return Err(error::validation_error(
            "Provider email is required and cannot be empty",
            json!({ "field": "email", "message": "Email must be provided and cannot be empty" }),
        ));
    }

    if email.chars().count() > 255 {
        return Err(error::validation_error(
            "Provider email exceeds maximum length",
            json!({
                "field": "email",
                "message": "Email cannot exceed 255 characters",
                "max_length": 255,
                "actual_length": email.chars().count()
            }),
        ));
    }

    if !is_valid_email(email) {
        return Err(error::validation_error(
            "Provider email is not a valid address",
            json!({ "field": "email", "message": "Email must be a syntactically valid address" }),
        ));
    }

    if phone.trim().is_empty() {
        return Err(error::validation_error(
            "Provider phone is required and cannot be empty",
            json!({ "field": "phone", "message": "Phone must be provided and cannot be empty" }),
        ));
    }

    if phone.chars().count() > 20 {
        return Err(error::validation_error(
            "Provider phone exceeds maximum length",
            json!({
                "field": "phone",
                "message": "Phone cannot exceed 20 characters",
                "max_length": 20,
                "actual_length": phone.chars().count()
            }),
        ));
    }

    Ok(())
}

/// Minimal syntactic email check: one `@`, non-empty halves, dotted domain
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && domain.split('.').all(|part| !part.is_empty())
}

/// Empty submitted type counts as unset, anything else must be a known choice
fn parse_kind_field(raw: Option<&str>) -> Result<Option<ProviderKind>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => ProviderKind::parse(value).map(Some).ok_or_else(|| {
            error::validation_error(
                "Provider type is not a known choice",
                json!({
                    "field": "type",
                    "message": "Type must be one of hotel, crucero, esqui, parque",
                    "value": value
                }),
            )
        }),
    }
}

fn redirect_to_list(locale: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [("Location", provider_list_path(locale))],
    )
        .into_response()
}

fn redirect_with_flash(locale: &str, message: &FlashMessage) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            ("Location", provider_list_path(locale)),
            ("Set-Cookie", flash::create_flash_cookie(message)),
        ],
    )
        .into_response()
}

fn conflict_error() -> ApiError {
    ApiError::new(
        StatusCode::CONFLICT,
        "CONFLICT",
        "A provider with these details already exists",
    )
    .with_details(json!({
        "message": "Name, email and phone must be unique among active providers"
    }))
}

fn map_lifecycle_error(err: LifecycleError) -> ApiError {
    if err.is_unique_violation() {
        return conflict_error();
    }

    match err {
        LifecycleError::NotFound { id } => {
            error::not_found(Some("Provider not found")).with_details(json!({ "provider_id": id }))
        }
        LifecycleError::TokenRejected { id } => {
            error::authorization_failure(Some("Delete token rejected"))
                .with_details(json!({ "provider_id": id }))
        }
        LifecycleError::Persistence(e) => ApiError::from(e),
    }
}

/// List active providers
#[utoipa::path(
    get,
    path = "/{locale}/provider",
    params(
        ("locale" = String, Path, description = "Locale code, must be in the supported set")
    ),
    responses(
        (status = 200, description = "Active providers with per-row delete tokens", body = ProviderApiResponse<ProviderListDto>),
        (status = 404, description = "Unsupported locale", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn list_providers(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    ensure_supported_locale(&state.config, &locale)?;

    let service = lifecycle_service(&state);
    let active = service.list_active().await.map_err(map_lifecycle_error)?;

    let providers = active
        .iter()
        .map(|model| provider_dto(model, &state.config.csrf_secret))
        .collect::<Result<Vec<_>, _>>()?;

    let pending_flash = flash::take_flash(&jar);
    let had_flash_cookie = jar.get(flash::FLASH_COOKIE_NAME).is_some();

    let payload = ProviderApiResponse::wrap(ProviderListDto {
        locale,
        providers,
        flash: pending_flash,
    });

    let mut response = Json(payload).into_response();
    if had_flash_cookie
        && let Ok(value) = header::HeaderValue::from_str(&flash::clear_flash_cookie())
    {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// Describe the create form
#[utoipa::path(
    get,
    path = "/{locale}/provider/new",
    params(
        ("locale" = String, Path, description = "Locale code, must be in the supported set")
    ),
    responses(
        (status = 200, description = "Create form descriptor", body = ProviderApiResponse<ProviderFormDescriptor>),
        (status = 404, description = "Unsupported locale", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn new_provider_form(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Json<ProviderApiResponse<ProviderFormDescriptor>>, ApiError> {
    ensure_supported_locale(&state.config, &locale)?;

    let descriptor = ProviderFormDescriptor {
        action: format!("/{}/provider/new", locale),
        method: "POST".to_string(),
        kind_choices: kind_choices(),
        values: None,
    };

    Ok(Json(ProviderApiResponse::wrap(descriptor)))
}

/// Create a provider
#[utoipa::path(
    post,
    path = "/{locale}/provider/new",
    params(
        ("locale" = String, Path, description = "Locale code, must be in the supported set")
    ),
    request_body = CreateProviderRequestDto,
    responses(
        (status = 303, description = "Created, redirect to the list with a flash cookie", headers(
            ("Location", description = "Provider list URL"),
            ("Set-Cookie", description = "One-time flash cookie")
        )),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 404, description = "Unsupported locale", body = ApiError),
        (status = 409, description = "Unique field already taken", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn create_provider(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    payload: Result<Json<CreateProviderRequestDto>, JsonRejection>,
) -> Result<Response, ApiError> {
    ensure_supported_locale(&state.config, &locale)?;
    let Json(request) = payload?;
    validate_provider_fields(&request.name, &request.email, &request.phone)?;
    let kind = parse_kind_field(request.kind.as_deref())?;

    let service = lifecycle_service(&state);
    let input = NewProvider {
        name: request.name,
        email: request.email,
        phone: request.phone,
        kind,
    };

    match service.create(input).await {
        Ok(_) => Ok(redirect_with_flash(&locale, &FlashMessage::created())),
        Err(err) if err.is_unique_violation() => Err(conflict_error()),
        Err(LifecycleError::Persistence(e)) => {
            tracing::error!(error = ?e, "Provider create failed");
            Ok(redirect_with_flash(&locale, &FlashMessage::error_generic()))
        }
        Err(err) => Err(map_lifecycle_error(err)),
    }
}

/// Describe the edit form, prefilled with the stored values
#[utoipa::path(
    get,
    path = "/{locale}/provider/{id}/edit",
    params(
        ("locale" = String, Path, description = "Locale code, must be in the supported set"),
        ("id" = i32, Path, description = "Provider id")
    ),
    responses(
        (status = 200, description = "Edit form descriptor with current values", body = ProviderApiResponse<ProviderFormDescriptor>),
        (status = 404, description = "Unsupported locale or unknown provider", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn edit_provider_form(
    State(state): State<AppState>,
    Path((locale, id)): Path<(String, i32)>,
) -> Result<Json<ProviderApiResponse<ProviderFormDescriptor>>, ApiError> {
    ensure_supported_locale(&state.config, &locale)?;

    let service = lifecycle_service(&state);
    let existing = service.get(id).await.map_err(map_lifecycle_error)?;
    let values = provider_dto(&existing, &state.config.csrf_secret)?;

    let descriptor = ProviderFormDescriptor {
        action: format!("/{}/provider/{}/edit", locale, id),
        method: "POST".to_string(),
        kind_choices: kind_choices(),
        values: Some(values),
    };

    Ok(Json(ProviderApiResponse::wrap(descriptor)))
}

/// Edit a provider
#[utoipa::path(
    post,
    path = "/{locale}/provider/{id}/edit",
    params(
        ("locale" = String, Path, description = "Locale code, must be in the supported set"),
        ("id" = i32, Path, description = "Provider id")
    ),
    request_body = UpdateProviderRequestDto,
    responses(
        (status = 303, description = "Updated, redirect to the list with a flash cookie", headers(
            ("Location", description = "Provider list URL"),
            ("Set-Cookie", description = "One-time flash cookie")
        )),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 404, description = "Unsupported locale or unknown provider", body = ApiError),
        (status = 409, description = "Unique field already taken", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn update_provider(
    State(state): State<AppState>,
    Path((locale, id)): Path<(String, i32)>,
    payload: Result<Json<UpdateProviderRequestDto>, JsonRejection>,
) -> Result<Response, ApiError> {
    ensure_supported_locale(&state.config, &locale)?;
    let Json(request) = payload?;
    validate_provider_fields(&request.name, &request.email, &request.phone)?;
    let kind = parse_kind_field(request.kind.as_deref())?;

    let service = lifecycle_service(&state);
    let update = ProviderUpdate {
        name: request.name,
        email: request.email,
        phone: request.phone,
        kind,
        active: request.active,
    };

    match service.edit(id, update).await {
        Ok(_) => Ok(redirect_with_flash(&locale, &FlashMessage::updated())),
        Err(err) if err.is_unique_violation() => Err(conflict_error()),
        Err(LifecycleError::Persistence(e)) => {
            tracing::error!(provider_id = id, error = ?e, "Provider edit failed");
            Ok(redirect_with_flash(&locale, &FlashMessage::error_generic()))
        }
        Err(err) => Err(map_lifecycle_error(err)),
    }
}

/// Soft-delete a provider
///
/// A rejected token produces the same redirect as success, with no flash and
/// no mutation; the rejection is logged server-side and never shown to the
/// submitter.
#[utoipa::path(
    post,
    path = "/{locale}/provider/{id}/delete",
    params(
        ("locale" = String, Path, description = "Locale code, must be in the supported set"),
        ("id" = i32, Path, description = "Provider id")
    ),
    request_body = DeleteProviderRequestDto,
    responses(
        (status = 303, description = "Redirect to the list; flash cookie only when the delete applied", headers(
            ("Location", description = "Provider list URL")
        )),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 404, description = "Unsupported locale or unknown provider", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn delete_provider(
    State(state): State<AppState>,
    Path((locale, id)): Path<(String, i32)>,
    payload: Result<Json<DeleteProviderRequestDto>, JsonRejection>,
) -> Result<Response, ApiError> {
    ensure_supported_locale(&state.config, &locale)?;
    let Json(request) = payload?;

    let service = lifecycle_service(&state);
    match service.soft_delete(id, &request.token).await {
        Ok(_) => Ok(redirect_with_flash(&locale, &FlashMessage::deleted())),
        Err(LifecycleError::TokenRejected { id }) => {
            warn!(provider_id = id, "Delete skipped, token rejected");
            Ok(redirect_to_list(&locale))
        }
        Err(LifecycleError::Persistence(e)) => {
            tracing::error!(provider_id = id, error = ?e, "Provider delete failed");
            Ok(redirect_with_flash(&locale, &FlashMessage::error_generic()))
        }
        Err(err) => Err(map_lifecycle_error(err)),
    }
}

/// Export active providers as CSV
#[utoipa::path(
    get,
    path = "/provider/export/csv",
    responses(
        (status = 200, description = "Accounting CSV, UTF-8 with BOM", content_type = "text/csv"),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn export_providers_csv(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let service = lifecycle_service(&state);
    let bytes = service
        .export_active_csv()
        .await
        .map_err(map_lifecycle_error)?;

    Ok((
        [
            ("Content-Type", "text/csv; charset=utf-8".to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        bytes,
    ))
}

/// Redirect the bare and legacy paths to the default-locale list
#[utoipa::path(
    get,
    path = "/provider",
    responses(
        (status = 303, description = "Redirect to the default-locale provider list", headers(
            ("Location", description = "Provider list URL")
        ))
    ),
    tag = "providers"
)]
pub async fn redirect_to_provider_list(State(state): State<AppState>) -> Response {
    redirect_to_list(&state.config.default_locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::init_pool;
    use crate::server::AppState;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use migration::{Migrator, MigratorTrait};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn setup_test_app() -> (AppState, axum::Router) {
        let config = AppConfig {
            profile: "test".to_string(),
            database_url: "sqlite::memory:".to_string(),
            ..Default::default()
        };

        let db = init_pool(&config).await.expect("Failed to init test DB");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let state = AppState {
            config: Arc::new(config),
            db,
        };
        let app = crate::server::create_app(state.clone());
        (state, app)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_sample_provider(app: &axum::Router, name: &str, email: &str) {
        let request = json_request(
            "POST",
            "/es/provider/new",
            json!({ "name": name, "email": email, "phone": "612345678", "type": "hotel" }),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    async fn list_providers_json(app: &axum::Router) -> Value {
        let request = Request::builder()
            .method("GET")
            .uri("/es/provider")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_list_providers_empty() {
        let (_state, app) = setup_test_app().await;

        let listing = list_providers_json(&app).await;

        assert_eq!(listing["data"]["locale"], "es");
        assert_eq!(listing["data"]["providers"].as_array().unwrap().len(), 0);
        assert!(listing["data"]["flash"].is_null());
        assert_eq!(listing["meta"]["request_id"].as_str().unwrap().len(), 36);
    }

    #[tokio::test]
    async fn test_create_provider_redirects_with_flash() {
        let (_state, app) = setup_test_app().await;

        let request = json_request(
            "POST",
            "/es/provider/new",
            json!({
                "name": "Acme",
                "email": "a@acme.com",
                "phone": "6123456789",
                "type": "hotel"
            }),
        );
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("Location").unwrap(), "/es/provider");
        let cookie = response
            .headers()
            .get("Set-Cookie")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("providers_flash=success:flash.created"));

        let listing = list_providers_json(&app).await;
        let providers = listing["data"]["providers"].as_array().unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0]["name"], "Acme");
        assert_eq!(providers[0]["type"], "hotel");
        assert_eq!(providers[0]["active"], true);
        assert!(!providers[0]["delete_token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_provider_validation_error() {
        let (_state, app) = setup_test_app().await;

        let request = json_request(
            "POST",
            "/es/provider/new",
            json!({ "name": "", "email": "a@acme.com", "phone": "612" }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error_json = body_json(response).await;
        assert_eq!(error_json["code"], "VALIDATION_FAILED");
        assert_eq!(error_json["details"]["field"], "name");
    }

    #[tokio::test]
    async fn test_create_provider_rejects_unknown_kind() {
        let (_state, app) = setup_test_app().await;

        let request = json_request(
            "POST",
            "/es/provider/new",
            json!({ "name": "Acme", "email": "a@acme.com", "phone": "612", "type": "balneario" }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error_json = body_json(response).await;
        assert_eq!(error_json["details"]["field"], "type");
    }

    #[tokio::test]
    async fn test_unsupported_locale_is_not_found() {
        let (_state, app) = setup_test_app().await;

        let request = Request::builder()
            .method("GET")
            .uri("/fr/provider")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error_json = body_json(response).await;
        assert_eq!(error_json["code"], "NOT_FOUND");
        assert_eq!(error_json["details"]["locale"], "fr");
    }

    #[tokio::test]
    async fn test_edit_form_unknown_provider_is_not_found() {
        let (_state, app) = setup_test_app().await;

        let request = Request::builder()
            .method("GET")
            .uri("/es/provider/999/edit")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error_json = body_json(response).await;
        assert_eq!(error_json["details"]["provider_id"], 999);
    }

    #[tokio::test]
    async fn test_edit_form_prefills_current_values() {
        let (_state, app) = setup_test_app().await;
        create_sample_provider(&app, "Acme", "a@acme.com").await;

        let listing = list_providers_json(&app).await;
        let id = listing["data"]["providers"][0]["id"].as_i64().unwrap();

        let request = Request::builder()
            .method("GET")
            .uri(format!("/es/provider/{}/edit", id))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let descriptor = body_json(response).await;
        assert_eq!(
            descriptor["data"]["action"],
            format!("/es/provider/{}/edit", id)
        );
        assert_eq!(descriptor["data"]["values"]["name"], "Acme");
        assert_eq!(
            descriptor["data"]["kind_choices"].as_array().unwrap().len(),
            4
        );
        assert!(
            !descriptor["data"]["values"]["delete_token"]
                .as_str()
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_with_invalid_token_is_silent() {
        let (_state, app) = setup_test_app().await;
        create_sample_provider(&app, "Acme", "a@acme.com").await;

        let listing = list_providers_json(&app).await;
        let id = listing["data"]["providers"][0]["id"].as_i64().unwrap();

        let request = json_request(
            "POST",
            &format!("/es/provider/{}/delete", id),
            json!({ "_token": "deadbeef" }),
        );
        let response = app.clone().oneshot(request).await.unwrap();

        // Same redirect as success, but no flash cookie and no mutation
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.headers().get("Set-Cookie").is_none());

        let listing = list_providers_json(&app).await;
        assert_eq!(listing["data"]["providers"].as_array().unwrap().len(), 1);
        assert_eq!(listing["data"]["providers"][0]["name"], "Acme");
    }

    #[tokio::test]
    async fn test_delete_with_valid_token_removes_from_listing() {
        let (_state, app) = setup_test_app().await;
        create_sample_provider(&app, "Acme", "a@acme.com").await;

        let listing = list_providers_json(&app).await;
        let id = listing["data"]["providers"][0]["id"].as_i64().unwrap();
        let token = listing["data"]["providers"][0]["delete_token"]
            .as_str()
            .unwrap()
            .to_string();

        let request = json_request(
            "POST",
            &format!("/es/provider/{}/delete", id),
            json!({ "_token": token }),
        );
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response
            .headers()
            .get("Set-Cookie")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("providers_flash=warning:flash.deleted"));

        let listing = list_providers_json(&app).await;
        assert_eq!(listing["data"]["providers"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_export_csv_headers_and_bom() {
        let (_state, app) = setup_test_app().await;
        create_sample_provider(&app, "Acme", "a@acme.com").await;

        let request = Request::builder()
            .method("GET")
            .uri("/provider/export/csv")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers().get("Content-Disposition").unwrap(),
            "attachment; filename=\"proveedores_contabilidad.csv\""
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("Nombre;Email;Teléfono;Tipo;Fecha de Registro\n"));
        assert!(text.contains("Acme;a@acme.com;612345678;Hotel;"));
    }

    #[tokio::test]
    async fn test_alias_routes_redirect_to_default_locale() {
        let (_state, app) = setup_test_app().await;

        for uri in ["/", "/provider", "/providers"] {
            let request = Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::SEE_OTHER, "uri {}", uri);
            assert_eq!(
                response.headers().get("Location").unwrap(),
                "/es/provider",
                "uri {}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_flash_is_consumed_by_list_render() {
        let (_state, app) = setup_test_app().await;
        create_sample_provider(&app, "Acme", "a@acme.com").await;

        let request = Request::builder()
            .method("GET")
            .uri("/es/provider")
            .header("Cookie", "providers_flash=success:flash.created")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        let clearing_cookie = response
            .headers()
            .get("Set-Cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(clearing_cookie.contains("Max-Age=0"));

        let listing = body_json(response).await;
        assert_eq!(listing["data"]["flash"]["category"], "success");
        assert_eq!(listing["data"]["flash"]["key"], "flash.created");

        // Without the cookie the next render carries no flash
        let listing = list_providers_json(&app).await;
        assert!(listing["data"]["flash"].is_null());
    }
}
